//! Line-oriented parameter transport.
//!
//! Reads `node/property=value` lines from any [`BufRead`] source (the
//! serial console on the device, a pipe or file on the host).  Blank lines
//! and `#` comments are skipped; malformed lines are logged and dropped.
//!
//! ```text
//! mode-selector/mode=Timed
//! timed-control/sprayer1-ontime=3
//! timed-control/sprayer1-startstop=Start
//! ```

use std::io::BufRead;

use log::warn;

use crate::app::ports::{ParamTransport, ParamUpdate};

pub struct LineTransport<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> LineTransport<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

/// Split one line into an update.  `None` for blank, comment or malformed
/// lines.
pub fn parse_line(line: &str) -> Option<ParamUpdate> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let Some((param, value)) = line.split_once('=') else {
        warn!("LINE: missing '=' in {:?}", line);
        return None;
    };
    let update = ParamUpdate::new(param.trim(), value.trim());
    if update.is_none() {
        warn!("LINE: parameter or value too long in {:?}", line);
    }
    update
}

impl<R: BufRead> ParamTransport for LineTransport<R> {
    fn poll(&mut self) -> Option<ParamUpdate> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    if let Some(update) = parse_line(&self.line) {
                        return Some(update);
                    }
                }
                Err(e) => {
                    warn!("LINE: read failed: {}", e);
                    return None;
                }
            }
        }
    }
}
