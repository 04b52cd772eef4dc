//! Typed leaf elements: one token in, one value out.

use std::net::IpAddr;
use std::num::ParseIntError;
use std::str::FromStr;

use bigdecimal::{BigDecimal, num_bigint::BigInt};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use cmdweave_foundation::{ArgumentParseError, Value};
use url::Url;
use uuid::Uuid;

use super::duration::parse_duration;
use crate::args::CommandArgs;
use crate::context::CommandContext;
use crate::format::ELLIPSIS;

/// What a leaf element reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafKind {
    /// Any single token.
    String,
    /// 32-bit integer; `0x` and `0b` prefixes select hex and binary.
    Integer,
    /// 64-bit integer; `0x` and `0b` prefixes select hex and binary.
    Long,
    /// Floating point number.
    Double,
    /// Arbitrary-precision integer.
    BigInteger,
    /// Arbitrary-precision decimal.
    BigDecimal,
    /// UUID in any format the `uuid` crate accepts.
    Uuid,
    /// Absolute URL.
    Url,
    /// IPv4 or IPv6 address literal.
    Ip,
    /// Date-time, time (today), or date (midnight). With `or_now`, falls
    /// back to the current time instead of failing.
    DateTime {
        /// Use the current time when the token is missing or malformed.
        or_now: bool,
    },
    /// ISO-8601 duration or shorthand such as `2h30m`.
    Duration,
    /// Consumes nothing and stores `true`.
    MarkTrue,
    /// Every remaining token. `raw` keeps the input text verbatim instead of
    /// joining token values with single spaces.
    RemainingJoined {
        /// Keep the raw input text.
        raw: bool,
    },
}

/// A keyed leaf element.
#[derive(Clone, Debug)]
pub struct LeafElement {
    pub(crate) key: String,
    pub(crate) kind: LeafKind,
}

impl LeafElement {
    pub(crate) fn new(key: impl Into<String>, kind: LeafKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }

    pub(crate) fn parse(
        &self,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Result<(), ArgumentParseError> {
        let value = self.parse_value(args)?;
        context.put_arg(self.key.clone(), value);
        Ok(())
    }

    fn parse_value(&self, args: &mut CommandArgs) -> Result<Value, ArgumentParseError> {
        match self.kind {
            LeafKind::MarkTrue => Ok(Value::Bool(true)),
            LeafKind::RemainingJoined { raw: true } => {
                args.next()?;
                let text = args.raw_from_current();
                while args.next_if_present().is_some() {}
                Ok(Value::from(text))
            }
            LeafKind::RemainingJoined { raw: false } => {
                let mut parts = vec![args.next()?];
                while let Some(part) = args.next_if_present() {
                    parts.push(part);
                }
                Ok(Value::from(parts.join(" ")))
            }
            LeafKind::DateTime { or_now } => {
                if or_now && !args.has_next() {
                    return Ok(Value::DateTime(now()));
                }
                let state = args.snapshot();
                let input = args.next()?;
                match parse_date_time(&input) {
                    Some(dt) => Ok(Value::DateTime(dt)),
                    None if or_now => {
                        args.apply_snapshot(&state, true);
                        Ok(Value::DateTime(now()))
                    }
                    None => Err(args.create_error(format!("Invalid date-time: {input}"))),
                }
            }
            kind => {
                let input = args.next()?;
                parse_token(kind, &input).map_err(|message| args.create_error(message))
            }
        }
    }

    pub(crate) fn complete(&self, args: &mut CommandArgs) -> Vec<String> {
        match self.kind {
            LeafKind::DateTime { .. } => {
                let prefix = args.next_if_present().unwrap_or_default();
                let date = now().format("%Y-%m-%dT%H:%M:%S").to_string();
                if date.starts_with(&prefix) {
                    vec![date]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    pub(crate) fn usage(&self) -> String {
        match self.kind {
            LeafKind::MarkTrue => String::new(),
            LeafKind::DateTime { or_now: true } => format!("[{}]", self.key),
            LeafKind::RemainingJoined { .. } => format!("<{}{ELLIPSIS}>", self.key),
            _ => format!("<{}>", self.key),
        }
    }
}

fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn parse_token(kind: LeafKind, input: &str) -> Result<Value, String> {
    match kind {
        LeafKind::Integer => parse_radix(input, i32::from_str_radix)
            .map(Value::Int)
            .map_err(|_| format!("Expected an integer, but input '{input}' was not")),
        LeafKind::Long => parse_radix(input, i64::from_str_radix)
            .map(Value::Long)
            .map_err(|_| format!("Expected a long, but input '{input}' was not")),
        LeafKind::Double => input
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| format!("Expected a number, but input '{input}' was not")),
        LeafKind::BigInteger => BigInt::from_str(input)
            .map(Value::BigInt)
            .map_err(|_| format!("Expected an integer, but input '{input}' was not")),
        LeafKind::BigDecimal => BigDecimal::from_str(input)
            .map(Value::BigDecimal)
            .map_err(|_| format!("Expected a number, but input '{input}' was not")),
        LeafKind::Uuid => Uuid::parse_str(input)
            .map(Value::Uuid)
            .map_err(|_| format!("Invalid UUID: {input}")),
        LeafKind::Url => Url::parse(input)
            .map(Value::Url)
            .map_err(|_| format!("Invalid URL: {input}")),
        LeafKind::Ip => input
            .parse::<IpAddr>()
            .map(Value::Ip)
            .map_err(|_| format!("Invalid IP address: {input}")),
        LeafKind::Duration => parse_duration(input)
            .map(Value::Duration)
            .ok_or_else(|| format!("Invalid duration: {input}")),
        LeafKind::String
        | LeafKind::DateTime { .. }
        | LeafKind::MarkTrue
        | LeafKind::RemainingJoined { .. } => Ok(Value::from(input)),
    }
}

fn parse_radix<T>(input: &str, parse: fn(&str, u32) -> Result<T, ParseIntError>) -> Result<T, ParseIntError> {
    if let Some(hex) = input.strip_prefix("0x") {
        parse(hex, 16)
    } else if let Some(binary) = input.strip_prefix("0b") {
        parse(binary, 2)
    } else {
        parse(input, 10)
    }
}

/// Full date-time, then time today, then date at midnight.
fn parse_date_time(input: &str) -> Option<NaiveDateTime> {
    const DATE_TIME: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
    const TIME: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

    DATE_TIME
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            TIME.iter()
                .find_map(|fmt| NaiveTime::parse_from_str(input, fmt).ok())
                .map(|time| Local::now().date_naive().and_time(time))
        })
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
