// SPDX-FileCopyrightText: 2026 ISD Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML transcript encoder.
//!
//! The Markdown document is rendered through comrak with tables enabled and
//! raw HTML suppressed, then wrapped in a standalone page.

use chrono::{DateTime, Utc};
use comrak::{Options, markdown_to_html};
use isd_core::{IsdError, Turn};

use crate::{TITLE, TableLimits, markdown};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:1200px;margin:0 auto;padding:20px}\
table{border-collapse:collapse;width:100%;margin:10px 0}\
th,td{border:1px solid #999;padding:6px;text-align:left}\
pre{background:#f4f4f4;padding:10px;overflow-x:auto}";

/// Renders the transcript as a standalone HTML page.
pub fn render(
    turns: &[Turn],
    limits: &TableLimits,
    exported_at: DateTime<Utc>,
) -> Result<String, IsdError> {
    let mut options = Options::default();
    options.extension.table = true;
    let body = markdown_to_html(&markdown::render(turns, limits, exported_at)?, &options);

    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{TITLE}</title>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    ))
}
