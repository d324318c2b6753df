//! Lenient scalar conversions shared by every dialect parser.
//!
//! Syndication documents in the wild break their own grammars constantly, so
//! none of these functions fail: anything that cannot be converted comes back
//! as `None` and the caller carries on with the rest of the document.
//!
//! # Examples
//!
//! ```
//! use feedkit::util::{decode_html, parse_date_time, parse_int};
//!
//! assert!(parse_date_time("Tue, 10 Jun 2003 04:00:00 GMT").is_some());
//! assert_eq!(parse_int::<u32>("60"), Some(60));
//! assert_eq!(decode_html("R&amp;D"), "R&D");
//! ```

mod lenient;

pub use lenient::{decode_html, parse_date_time, parse_int};
