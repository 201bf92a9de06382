use anyhow::{anyhow, Result};

use crate::pdf::splitter::SplitRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Number(i64),
    End,
}

impl PageRef {
    fn resolve(&self, total_pages: u32) -> i64 {
        match self {
            PageRef::Number(n) => *n,
            PageRef::End => i64::from(total_pages),
        }
    }
}

/// A split as written on the command line: `NAME=START-END` or `NAME=PAGE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitSpec {
    pub filename: String,
    pub start: PageRef,
    pub end: PageRef,
}

impl SplitSpec {
    /// Parse a split like "intro=1-5", "rest=6-end" or "cover=1"
    pub fn parse(s: &str) -> Result<Self> {
        let (name, range) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid split {:?}: expected NAME=START-END", s))?;

        let filename = name.trim();
        if filename.is_empty() {
            return Err(anyhow!("Invalid split {:?}: missing file name", s));
        }

        let range = range.trim();
        if range.is_empty() {
            return Err(anyhow!("Invalid split {:?}: missing page range", s));
        }

        // A leading dash would be a negative number, not a range separator
        let (start, end) = match range.char_indices().skip(1).find(|&(_, c)| c == '-') {
            Some((pos, _)) => (
                parse_page_ref(&range[..pos])?,
                parse_page_ref(&range[pos + 1..])?,
            ),
            None => {
                let page = parse_page_ref(range)?;
                (page.clone(), page)
            }
        };

        Ok(SplitSpec {
            filename: filename.to_string(),
            start,
            end,
        })
    }

    /// Fix `end` references against the document; range checks happen in the splitter
    pub fn resolve(&self, total_pages: u32) -> SplitRequest {
        SplitRequest::new(
            self.filename.clone(),
            self.start.resolve(total_pages),
            self.end.resolve(total_pages),
        )
    }
}

fn parse_page_ref(s: &str) -> Result<PageRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(PageRef::End)
    } else {
        s.parse::<i64>()
            .map(PageRef::Number)
            .map_err(|_| anyhow!("Invalid page number: {}", s))
    }
}
