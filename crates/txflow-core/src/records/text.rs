//! Compact text records:
//!
//! ```text
//! txid:<id> vin:<prev_txid>:<index>,... vout:<address>:<btc>,... [label:<label>]
//! ```
//!
//! The optional `label:` token must come last and runs to the end of the
//! line, so labels may contain spaces. A coinbase transaction has an empty
//! `vin:` list (`vin:coinbase` is accepted on input).

use crate::error::CoreError;
use crate::types::{format_btc, parse_btc, TxInput, TxOutput, TxRecord};

use super::{parse_error, RecordCodec};

const LABEL_PREFIX: &str = "label:";
const COINBASE: &str = "coinbase";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl RecordCodec for TextCodec {
    fn encode(&self, record: &TxRecord) -> Result<String, CoreError> {
        check_token(&record.txid, "txid")?;

        let vin = record
            .vin
            .iter()
            .map(|input| -> Result<String, CoreError> {
                check_token(&input.txid, "input txid")?;
                Ok(format!("{}:{}", input.txid, input.vout))
            })
            .collect::<Result<Vec<_>, CoreError>>()?
            .join(",");
        let vout = record
            .vout
            .iter()
            .map(|output| -> Result<String, CoreError> {
                check_token(&output.address, "address")?;
                Ok(format!("{}:{}", output.address, format_btc(output.value)))
            })
            .collect::<Result<Vec<_>, CoreError>>()?
            .join(",");

        let mut line = format!("txid:{} vin:{vin} vout:{vout}", record.txid);
        if let Some(label) = record.label.as_deref().map(str::trim) {
            if !label.is_empty() {
                line.push(' ');
                line.push_str(LABEL_PREFIX);
                line.push_str(&label.replace(['\r', '\n'], " "));
            }
        }
        Ok(line)
    }

    fn decode(&self, line: &str, line_num: usize) -> Result<TxRecord, CoreError> {
        let (body, label) = match find_label_token(line) {
            Some(pos) => (&line[..pos], Some(line[pos + LABEL_PREFIX.len()..].trim())),
            None => (line, None),
        };

        let mut txid = None;
        let mut vin = None;
        let mut vout = None;
        for token in body.split_whitespace() {
            if let Some(value) = token.strip_prefix("txid:") {
                set_once(&mut txid, value.to_owned(), "txid", line_num)?;
            } else if let Some(value) = token.strip_prefix("vin:") {
                set_once(&mut vin, parse_inputs(value, line_num)?, "vin", line_num)?;
            } else if let Some(value) = token.strip_prefix("vout:") {
                set_once(&mut vout, parse_outputs(value, line_num)?, "vout", line_num)?;
            } else {
                return Err(parse_error(line_num, format!("unexpected token `{token}`")));
            }
        }

        let txid = txid
            .filter(|t| !t.is_empty())
            .ok_or_else(|| parse_error(line_num, "missing txid"))?;
        Ok(TxRecord {
            txid,
            label: label.filter(|l| !l.is_empty()).map(str::to_owned),
            vin: vin.unwrap_or_default(),
            vout: vout.unwrap_or_default(),
        })
    }
}

/// Byte offset of a `label:` token that starts at a token boundary.
fn find_label_token(line: &str) -> Option<usize> {
    line.match_indices(LABEL_PREFIX)
        .map(|(pos, _)| pos)
        .find(|&pos| pos == 0 || line[..pos].ends_with(char::is_whitespace))
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    name: &str,
    line_num: usize,
) -> Result<(), CoreError> {
    if slot.is_some() {
        return Err(parse_error(line_num, format!("duplicate `{name}:` token")));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_inputs(list: &str, line_num: usize) -> Result<Vec<TxInput>, CoreError> {
    if list.is_empty() || list == COINBASE {
        return Ok(Vec::new());
    }

    let mut inputs = Vec::new();
    for item in list.split(',') {
        let (txid, vout) = item
            .rsplit_once(':')
            .ok_or_else(|| parse_error(line_num, format!("input `{item}` is not txid:index")))?;
        if txid == COINBASE {
            continue;
        }
        if txid.is_empty() {
            return Err(parse_error(line_num, format!("input `{item}` has no txid")));
        }
        let vout = vout
            .parse::<u32>()
            .map_err(|e| parse_error(line_num, format!("input `{item}` index: {e}")))?;
        inputs.push(TxInput {
            txid: txid.to_owned(),
            vout,
            value: None,
        });
    }
    Ok(inputs)
}

fn parse_outputs(list: &str, line_num: usize) -> Result<Vec<TxOutput>, CoreError> {
    if list.is_empty() {
        return Ok(Vec::new());
    }

    list.split(',')
        .map(|item| -> Result<TxOutput, CoreError> {
            let (address, amount) = item.rsplit_once(':').ok_or_else(|| {
                parse_error(line_num, format!("output `{item}` is not address:amount"))
            })?;
            if address.is_empty() {
                return Err(parse_error(line_num, format!("output `{item}` has no address")));
            }
            let value = parse_btc(amount).map_err(|e| parse_error(line_num, e.to_string()))?;
            Ok(TxOutput {
                address: address.to_owned(),
                value,
            })
        })
        .collect()
}

/// Identifiers are written unquoted, so separators cannot appear in them.
fn check_token(value: &str, what: &str) -> Result<(), CoreError> {
    if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == ',') {
        return Err(CoreError::InvalidTxData(format!(
            "{what} `{value}` cannot be written in text format"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use bitcoin::Amount;

    use super::*;
    use crate::test_util::{input, output, record};

    #[test]
    fn encodes_documented_layout() {
        let rec = record(
            "abc123",
            vec![input("prev1", 0), input("prev2", 1)],
            vec![output("addr1", 150_000_000), output("addr2", 230_000_000)],
        );
        assert_eq!(
            TextCodec.encode(&rec).expect("encode"),
            "txid:abc123 vin:prev1:0,prev2:1 vout:addr1:1.5,addr2:2.3"
        );
    }

    #[test]
    fn round_trip_keeps_inputs_outputs_and_label() {
        let mut rec = record(
            "deadbeef",
            vec![input("p", 3)],
            vec![output("[p2pk:4104678afdb0fe5548...]", 5_000_000_000)],
        );
        rec.label = Some("Block reward payout".into());

        let line = TextCodec.encode(&rec).expect("encode");
        let decoded = TextCodec.decode(&line, 1).expect("decode");
        assert_eq!(decoded, rec);
    }

    #[test]
    fn input_values_are_not_carried() {
        let mut rec = record("aa", vec![input("p", 0)], vec![]);
        rec.vin[0].value = Some(Amount::from_sat(42));
        let decoded = TextCodec
            .decode(&TextCodec.encode(&rec).expect("encode"), 1)
            .expect("decode");
        assert_eq!(decoded.vin[0].value, None);
        assert_eq!(decoded.vin[0].txid, "p");
    }

    #[test]
    fn coinbase_and_empty_lists_decode_to_no_inputs() {
        let decoded = TextCodec
            .decode("txid:aa vin:coinbase vout:x:0.5", 1)
            .expect("decode");
        assert!(decoded.vin.is_empty());
        assert_eq!(decoded.vout[0].value, Amount::from_sat(50_000_000));

        let decoded = TextCodec.decode("txid:bb vin: vout:", 1).expect("decode");
        assert!(decoded.vin.is_empty());
        assert!(decoded.vout.is_empty());
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "vin:a:0 vout:b:1",
            "txid:aa extra",
            "txid:aa txid:bb",
            "txid:aa vin:p:x",
            "txid:aa vout:addr",
            "txid:aa vout:addr:-1",
            r#"{"txid":"aa"}"#,
        ] {
            assert!(TextCodec.decode(line, 1).is_err(), "should reject `{line}`");
        }
    }

    #[test]
    fn encode_rejects_identifiers_with_separators() {
        let rec = record("has space", vec![], vec![]);
        assert!(TextCodec.encode(&rec).is_err());
        let rec = record("aa", vec![], vec![output("a,b", 1)]);
        assert!(TextCodec.encode(&rec).is_err());
    }
}
