//! XML export parser
//!
//! The XML serialization nests entities under a fixed envelope path and is
//! ambiguous in two ways: a repeatable element may appear once (bare object)
//! or many times, and the entity name may live in a `NAME` attribute or a
//! `NAME` child element. Both ambiguities are absorbed by a generic element
//! tree ([`XmlNode`]) with list-returning child accessors and a single
//! name-accessor, so entity extraction never branches on shape.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::classify::{classify_nature, map_voucher_type};
use crate::parse::encoding::strip_to_xml_start;
use crate::parse::values::{parse_date, parse_signed_amount};
use crate::types::{
    Group, ImportError, ImportResult, Ledger, Nature, ParsedDataSet, StockItem, Voucher,
    VoucherEntry,
};

/// One element of the parsed document
#[derive(Debug, Default)]
pub struct XmlNode {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<XmlNode>,
    pub text: String,
}

impl XmlNode {
    /// Parse a whole document into a synthetic root node whose children are
    /// the top-level elements
    pub fn parse_document(text: &str) -> ImportResult<XmlNode> {
        let mut reader = Reader::from_str(text);
        let mut stack = vec![XmlNode::default()];

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => stack.push(element_from(&start)?),
                Ok(Event::Empty(start)) => {
                    let node = element_from(&start)?;
                    push_child(&mut stack, node);
                }
                Ok(Event::End(_)) => {
                    // quick-xml has already verified the end tag matches
                    if let Some(node) = stack.pop() {
                        push_child(&mut stack, node);
                    }
                }
                Ok(Event::Text(text)) => {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| ImportError::parse("XML", e.to_string()))?;
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&unescaped);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(ImportError::parse("XML", e.to_string())),
            }
        }

        if stack.len() != 1 {
            return Err(ImportError::parse(
                "XML",
                format!("unexpected end of file: {} unclosed element(s)", stack.len() - 1),
            ));
        }
        Ok(stack.pop().unwrap_or_default())
    }

    /// First direct child with the given tag (case-insensitive)
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find(|child| child.name.eq_ignore_ascii_case(name))
    }

    /// All direct children with the given tag, single instances included
    pub fn children_named(&self, name: &str) -> Vec<&XmlNode> {
        self.children
            .iter()
            .filter(|child| child.name.eq_ignore_ascii_case(name))
            .collect()
    }

    /// All direct children whose tag contains the given fragment
    /// (case-insensitive); matches wrapper tags like `<...MESSAGE>` and
    /// `<...LEDGERENTRIES.LIST>` across export dialects
    pub fn children_containing(&self, fragment: &str) -> Vec<&XmlNode> {
        let fragment = fragment.to_lowercase();
        self.children
            .iter()
            .filter(|child| child.name.to_lowercase().contains(&fragment))
            .collect()
    }

    /// Attribute value (case-insensitive key)
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Trimmed non-empty text of a direct child
    pub fn text_of(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|child| child.text.trim())
            .filter(|text| !text.is_empty())
    }

    /// Trimmed non-empty text of the first descendant with the given tag,
    /// depth-first; reaches through wrapper lists like `<ADDRESS.LIST>`
    pub fn descendant_text(&self, name: &str) -> Option<&str> {
        for child in &self.children {
            if child.name.eq_ignore_ascii_case(name) {
                let text = child.text.trim();
                if !text.is_empty() {
                    return Some(text);
                }
            }
            if let Some(text) = child.descendant_text(name) {
                return Some(text);
            }
        }
        None
    }

    /// The entity's name, wherever the source put it: the `NAME` attribute
    /// when present, otherwise the `NAME` child element
    pub fn name_value(&self) -> Option<String> {
        self.attr("NAME")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| self.text_of("NAME"))
            .map(str::to_string)
    }
}

fn element_from(start: &BytesStart<'_>) -> ImportResult<XmlNode> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = HashMap::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ImportError::parse("XML", e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(attribute.value.as_ref());
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| ImportError::parse("XML", e.to_string()))?
            .into_owned();
        attributes.insert(key, value);
    }
    Ok(XmlNode {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn push_child(stack: &mut [XmlNode], node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Parse decoded XML text into a canonical data set
///
/// The message collection lives at the fixed path
/// Envelope→Body→ImportData→RequestData; a document without it yields an
/// empty set rather than an error.
pub fn parse(text: &str) -> ImportResult<ParsedDataSet> {
    let document = XmlNode::parse_document(strip_to_xml_start(text))?;

    let request_data = document
        .child("ENVELOPE")
        .and_then(|envelope| envelope.child("BODY"))
        .and_then(|body| body.child("IMPORTDATA"))
        .and_then(|import_data| import_data.child("REQUESTDATA"));

    let mut data = ParsedDataSet::default();
    let Some(request_data) = request_data else {
        return Ok(data);
    };

    for message in request_data.children_containing("MESSAGE") {
        for node in message.children_named("GROUP") {
            if let Some(group) = group_from_node(node) {
                data.groups.push(group);
            }
        }
        for node in message.children_named("LEDGER") {
            if let Some(ledger) = ledger_from_node(node) {
                data.ledgers.push(ledger);
            }
        }
        for node in message.children_named("STOCKITEM") {
            if let Some(item) = stock_item_from_node(node) {
                data.stock_items.push(item);
            }
        }
        for node in message.children_named("VOUCHER") {
            if let Some(voucher) = voucher_from_node(node) {
                data.vouchers.push(voucher);
            }
        }
    }
    Ok(data)
}

fn group_from_node(node: &XmlNode) -> Option<Group> {
    let name = node.name_value()?;
    let parent = node.text_of("PARENT").map(str::to_string);
    let nature = node
        .text_of("NATURE")
        .and_then(Nature::from_source)
        .unwrap_or_else(|| classify_nature(&name));
    Some(Group {
        name,
        parent,
        nature,
    })
}

fn ledger_from_node(node: &XmlNode) -> Option<Ledger> {
    let name = node.name_value()?;
    let group_name = node
        .text_of("PARENT")
        .or_else(|| node.text_of("GROUP"))
        .unwrap_or_default()
        .to_string();
    let opening_balance =
        parse_signed_amount(node.text_of("OPENINGBALANCE").unwrap_or_default());

    Some(Ledger {
        name,
        group_name,
        address: node.descendant_text("ADDRESS").map(str::to_string),
        state: node
            .descendant_text("STATENAME")
            .or_else(|| node.descendant_text("STATE"))
            .map(str::to_string),
        pincode: node.descendant_text("PINCODE").map(str::to_string),
        gstin: node
            .descendant_text("PARTYGSTIN")
            .or_else(|| node.descendant_text("GSTIN"))
            .map(str::to_string),
        pan: node
            .descendant_text("INCOMETAXNUMBER")
            .or_else(|| node.descendant_text("PAN"))
            .map(str::to_string),
        email: node.descendant_text("EMAIL").map(str::to_string),
        phone: node
            .descendant_text("LEDGERPHONE")
            .or_else(|| node.descendant_text("PHONE"))
            .map(str::to_string),
        opening_balance,
        is_default: false,
    })
}

fn stock_item_from_node(node: &XmlNode) -> Option<StockItem> {
    let name = node.name_value()?;
    let group_name = node.text_of("PARENT").unwrap_or_default().to_string();
    let unit = node
        .text_of("BASEUNITS")
        .or_else(|| node.text_of("UNIT"))
        .unwrap_or("Nos")
        .to_string();
    let gst_rate = node
        .descendant_text("GSTRATE")
        .map(parse_signed_amount)
        .filter(|rate| *rate != BigDecimal::from(0));

    Some(StockItem {
        name,
        group_name,
        unit,
        hsn_code: node
            .descendant_text("HSNCODE")
            .or_else(|| node.descendant_text("HSN"))
            .map(str::to_string),
        gst_rate,
        opening_qty: parse_signed_amount(node.text_of("OPENINGQTY").unwrap_or_default()),
        opening_value: parse_signed_amount(node.text_of("OPENINGVALUE").unwrap_or_default()),
    })
}

fn voucher_from_node(node: &XmlNode) -> Option<Voucher> {
    let number = node
        .text_of("VOUCHERNUMBER")
        .or_else(|| node.attr("VCHNUMBER"))?
        .to_string();
    let date = parse_date(node.text_of("DATE")?)?;
    let voucher_type = map_voucher_type(
        node.text_of("VOUCHERTYPENAME")
            .or_else(|| node.attr("VCHTYPE"))
            .unwrap_or_default(),
    );
    let party_name = node
        .text_of("PARTYLEDGERNAME")
        .or_else(|| node.text_of("PARTYNAME"))
        .map(str::to_string);
    let narration = node.text_of("NARRATION").unwrap_or_default().to_string();

    let mut entries = Vec::new();
    for entry_node in node.children_containing("LEDGERENTRIES") {
        let Some(ledger_name) = entry_node
            .text_of("LEDGERNAME")
            .or_else(|| entry_node.descendant_text("LEDGERNAME"))
        else {
            continue;
        };
        let amount = parse_signed_amount(entry_node.text_of("AMOUNT").unwrap_or_default());
        entries.push(VoucherEntry::from_signed(ledger_name.to_string(), amount));
    }

    let total_amount = voucher_total(&entries)
        .unwrap_or_else(|| parse_signed_amount(node.text_of("AMOUNT").unwrap_or_default()).abs());

    Some(Voucher {
        voucher_type,
        number,
        date,
        party_name,
        narration,
        entries,
        total_amount,
    })
}

/// Total of a voucher from its entries: the debit side when present,
/// otherwise the absolute credit side; `None` when there are no entries
fn voucher_total(entries: &[VoucherEntry]) -> Option<BigDecimal> {
    if entries.is_empty() {
        return None;
    }
    let zero = BigDecimal::from(0);
    let debit_total: BigDecimal = entries
        .iter()
        .filter(|entry| entry.amount > zero)
        .map(|entry| entry.amount.clone())
        .sum();
    if debit_total > zero {
        return Some(debit_total);
    }
    let credit_total: BigDecimal = entries
        .iter()
        .filter(|entry| entry.amount < zero)
        .map(|entry| entry.amount.clone())
        .sum();
    Some(credit_total.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntryType, VoucherType};
    use chrono::NaiveDate;

    const ENVELOPE: &str = r#"<ENVELOPE>
  <BODY><IMPORTDATA><REQUESTDATA>
    <TALLYMESSAGE>
      <GROUP NAME="Sundry Creditors"><PARENT>Current Liabilities</PARENT></GROUP>
      <GROUP><NAME>Sundry Debtors</NAME></GROUP>
    </TALLYMESSAGE>
    <TALLYMESSAGE>
      <LEDGER NAME="ABC Traders">
        <PARENT>Sundry Creditors</PARENT>
        <ADDRESS.LIST><ADDRESS>12 Market Road</ADDRESS></ADDRESS.LIST>
        <PARTYGSTIN>27AAAAA0000A1Z5</PARTYGSTIN>
        <OPENINGBALANCE>Cr 5000</OPENINGBALANCE>
      </LEDGER>
      <VOUCHER VCHTYPE="Sales">
        <VOUCHERNUMBER>V-1</VOUCHERNUMBER>
        <DATE>20240315</DATE>
        <PARTYLEDGERNAME>ABC Traders</PARTYLEDGERNAME>
        <NARRATION>March sale</NARRATION>
        <ALLLEDGERENTRIES.LIST>
          <LEDGERNAME>ABC Traders</LEDGERNAME>
          <AMOUNT>Dr 5900</AMOUNT>
        </ALLLEDGERENTRIES.LIST>
        <ALLLEDGERENTRIES.LIST>
          <LEDGERNAME>Sales</LEDGERNAME>
          <AMOUNT>Cr 5900</AMOUNT>
        </ALLLEDGERENTRIES.LIST>
      </VOUCHER>
    </TALLYMESSAGE>
  </REQUESTDATA></IMPORTDATA></BODY>
</ENVELOPE>"#;

    #[test]
    fn parses_groups_from_attribute_and_child_names() {
        let data = parse(ENVELOPE).unwrap();
        assert_eq!(data.groups.len(), 2);
        assert_eq!(data.groups[0].name, "Sundry Creditors");
        assert_eq!(data.groups[0].nature, Nature::Liability);
        assert_eq!(data.groups[1].name, "Sundry Debtors");
        assert_eq!(data.groups[1].nature, Nature::Asset);
    }

    #[test]
    fn parses_ledgers_through_wrapper_lists() {
        let data = parse(ENVELOPE).unwrap();
        assert_eq!(data.ledgers.len(), 1);
        let ledger = &data.ledgers[0];
        assert_eq!(ledger.group_name, "Sundry Creditors");
        assert_eq!(ledger.address.as_deref(), Some("12 Market Road"));
        assert_eq!(ledger.gstin.as_deref(), Some("27AAAAA0000A1Z5"));
        assert_eq!(ledger.opening_balance, BigDecimal::from(-5000));
    }

    #[test]
    fn parses_vouchers_with_entries() {
        let data = parse(ENVELOPE).unwrap();
        assert_eq!(data.vouchers.len(), 1);
        let voucher = &data.vouchers[0];
        assert_eq!(voucher.voucher_type, VoucherType::Sales);
        assert_eq!(voucher.number, "V-1");
        assert_eq!(voucher.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(voucher.party_name.as_deref(), Some("ABC Traders"));
        assert_eq!(voucher.entries.len(), 2);
        assert_eq!(voucher.entries[0].entry_type, EntryType::Debit);
        assert_eq!(voucher.entries[1].entry_type, EntryType::Credit);
        assert_eq!(voucher.total_amount, BigDecimal::from(5900));
    }

    #[test]
    fn single_message_and_single_entity_normalize_to_lists() {
        let text = r#"<ENVELOPE><BODY><IMPORTDATA><REQUESTDATA>
            <TALLYMESSAGE><GROUP NAME="Capital Account"/></TALLYMESSAGE>
        </REQUESTDATA></IMPORTDATA></BODY></ENVELOPE>"#;
        let data = parse(text).unwrap();
        assert_eq!(data.groups.len(), 1);
        assert_eq!(data.groups[0].nature, Nature::Liability);
    }

    #[test]
    fn missing_message_collection_yields_empty_set() {
        let data = parse("<ENVELOPE><BODY/></ENVELOPE>").unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn leading_junk_is_tolerated() {
        let text = format!("\u{feff}garbage{}", ENVELOPE);
        let data = parse(&text).unwrap();
        assert_eq!(data.groups.len(), 2);
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        let result = parse("<ENVELOPE><BODY></ENVELOPE>");
        assert!(matches!(result, Err(ImportError::Parse { .. })));
    }

    #[test]
    fn truncated_document_is_a_parse_error() {
        let result = parse("<ENVELOPE><BODY><IMPORTDATA>");
        match result {
            Err(ImportError::Parse { hint, .. }) => {
                assert_eq!(hint, "likely truncated upload");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
