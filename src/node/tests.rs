use std::collections::BTreeMap;
use std::io::BufReader;

use bytes::Bytes;

use super::*;
use crate::error::{ErrorKind, NodeError};

#[test]
fn test_decode_string() {
    assert_eq!(decode(b"4:spam").unwrap(), Node::string("spam"));
    assert_eq!(
        decode(b"0:").unwrap(),
        Node::String(Bytes::from_static(b""))
    );
}

#[test]
fn test_decode_binary_string() {
    let node = decode(b"3:\x00\xff\x10").unwrap();
    assert_eq!(node.as_bytes().map(|b| b.as_ref()), Some(&b"\x00\xff\x10"[..]));
    assert_eq!(node.as_str(), None);
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b"i42e").unwrap(), Node::Integer(42));
    assert_eq!(decode(b"i-42e").unwrap(), Node::Integer(-42));
    assert_eq!(decode(b"i0e").unwrap(), Node::Integer(0));
    assert_eq!(decode(b"i007e").unwrap(), Node::Integer(7));
}

#[test]
fn test_decode_integer_without_digits() {
    assert_eq!(decode(b"ie").unwrap_err().kind(), ErrorKind::Syntax);
    assert_eq!(decode(b"i-e").unwrap_err().kind(), ErrorKind::Syntax);
}

#[test]
fn test_decode_list() {
    let result = decode(b"l4:spam4:eggse").unwrap();
    match result {
        Node::List(l) => {
            assert_eq!(l.len(), 2);
            assert_eq!(l[0], Node::string("spam"));
            assert_eq!(l[1], Node::string("eggs"));
        }
        _ => panic!("expected list"),
    }
}

#[test]
fn test_decode_dict() {
    let result = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
    match result {
        Node::Dictionary(d) => {
            assert_eq!(d.len(), 2);
            assert_eq!(d.get(&b"cow"[..]), Some(&Node::string("moo")));
            assert_eq!(d.get(&b"spam"[..]), Some(&Node::string("eggs")));
        }
        _ => panic!("expected dictionary"),
    }
}

#[test]
fn test_decode_nested() {
    let node = decode(b"d4:1234i5678e4:listli8909e1:aee").unwrap();
    assert_eq!(node.get(b"1234"), Some(&Node::Integer(5678)));
    let list = node.get(b"list").and_then(|l| l.as_list()).unwrap();
    assert_eq!(list, &[Node::Integer(8909), Node::string("a")][..]);
}

#[test]
fn test_dict_keys_compared_by_content() {
    // two separately parsed keys with equal bytes are the same key
    let err = decode(b"d1:ai1e1:ai2ee").unwrap_err();
    assert!(matches!(err, NodeError::DuplicateKey { ref key } if key == b"a"));
}

#[test]
fn test_dict_non_string_key() {
    let err = decode(b"di1e3:fooe").unwrap_err();
    assert!(matches!(err, NodeError::NonStringKey { offset: 1 }));
    assert!(decode(b"ddi1234e2:qqel4:abcdee").is_err());
}

#[test]
fn test_truncated_string() {
    let err = scan_required(&b"4:ab"[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Truncation);
    assert!(matches!(
        err,
        NodeError::Truncated {
            offset: 2,
            expected: 4,
            found: 2
        }
    ));
}

#[test]
fn test_not_a_node() {
    let err = scan_required(&b"x"[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotANode);
    assert!(matches!(err, NodeError::NotANode { offset: 0, found: b'x' }));
}

#[test]
fn test_missing_integer_terminator() {
    let err = scan_required(&b"i12"[..]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(matches!(
        err,
        NodeError::Syntax {
            offset: 3,
            found: None,
            ..
        }
    ));
}

#[test]
fn test_missing_string_separator() {
    let err = scan_required(&b"4spam"[..]).unwrap_err();
    assert!(matches!(
        err,
        NodeError::Syntax {
            offset: 1,
            found: Some(b's'),
            ..
        }
    ));
}

#[test]
fn test_unterminated_list_is_truncation() {
    assert_eq!(
        decode(b"l4:spam").unwrap_err().kind(),
        ErrorKind::Truncation
    );
    assert_eq!(
        decode(b"d3:cow3:moo").unwrap_err().kind(),
        ErrorKind::Truncation
    );
}

#[test]
fn test_child_error_stops_composite() {
    let mut parser = Parser::new(&b"li1ex4:spame"[..]);
    let err = parser.scan_one().unwrap_err();
    assert!(matches!(err, NodeError::NotANode { offset: 4, .. }));
    // nothing after the failing child was consumed
    assert_eq!(parser.offset(), 4);
}

#[test]
fn test_scan_one_end_of_input() {
    assert_eq!(scan_one(&b""[..]).unwrap(), None);

    let err = scan_required(&b""[..]).unwrap_err();
    assert!(err.is_end_of_input());
}

#[test]
fn test_scan_one_sequence() {
    let mut parser = Parser::new(&b"i1el4:spamed3:cow3:mooe"[..]);
    assert_eq!(parser.scan_one().unwrap(), Some(Node::Integer(1)));
    assert!(matches!(parser.scan_one().unwrap(), Some(Node::List(_))));
    assert!(matches!(parser.scan_one().unwrap(), Some(Node::Dictionary(_))));
    assert_eq!(parser.scan_one().unwrap(), None);
    assert!(!parser.is_poisoned());
    // end of input stays a clean result
    assert_eq!(parser.scan_one().unwrap(), None);
}

#[test]
fn test_error_latches_until_cleared() {
    let mut parser = Parser::new(&b"x4:spam"[..]);
    assert!(parser.scan_one().is_err());
    assert!(parser.is_poisoned());
    assert!(matches!(parser.scan_one(), Err(NodeError::Poisoned)));
    assert!(matches!(parser.scanner().peek(), Err(NodeError::Poisoned)));

    parser.clear();
    // the bad byte was never consumed
    assert!(matches!(
        parser.scan_one(),
        Err(NodeError::NotANode { found: b'x', .. })
    ));
}

#[test]
fn test_scanner_primitives() {
    let mut scanner = Scanner::new(&b"123:abcd"[..]);
    assert_eq!(scanner.peek().unwrap(), b'1');
    assert_eq!(scanner.read_unsigned_decimal().unwrap(), 123);
    assert_eq!(scanner.advance().unwrap(), b':');
    assert_eq!(scanner.take(2).unwrap(), Bytes::from_static(b"ab"));
    assert_eq!(scanner.offset(), 6);
    assert!(scanner.take(3).is_err());
    assert!(scanner.is_poisoned());
    assert!(matches!(scanner.advance(), Err(NodeError::Poisoned)));
}

#[test]
fn test_scanner_peek_at_end() {
    let mut scanner = Scanner::new(&b""[..]);
    assert_eq!(scanner.try_peek().unwrap(), None);
    assert!(scanner.peek().unwrap_err().is_end_of_input());
}

#[test]
fn test_small_buffered_reader() {
    // payloads spanning several buffer refills
    let data = b"d4:name11:example.txt6:lengthi1024ee";
    let reader = BufReader::with_capacity(2, &data[..]);
    let node = scan_required(reader).unwrap();
    assert_eq!(node.get(b"name").and_then(|n| n.as_str()), Some("example.txt"));
    assert_eq!(node.get(b"length").and_then(|n| n.as_integer()), Some(1024));
}

#[test]
fn test_nesting_limit() {
    let limits = Limits::default().with_max_depth(2);
    let mut parser = Parser::with_limits(&b"lli1eee"[..], limits);
    assert!(parser.scan_required().is_ok());

    let mut parser = Parser::with_limits(&b"llli1eeee"[..], limits);
    assert_eq!(
        parser.scan_required().unwrap_err().kind(),
        ErrorKind::Limit
    );
}

#[test]
fn test_string_length_limit() {
    let limits = Limits::default().with_max_string_length(3);
    let mut parser = Parser::with_limits(&b"4:spam"[..], limits);
    assert!(matches!(
        parser.scan_required(),
        Err(NodeError::StringTooLong { length: 4, max: 3 })
    ));
}

#[test]
fn test_huge_length_prefix_is_truncation() {
    let err = scan_required(&b"9999999:ab"[..]).unwrap_err();
    assert!(matches!(err, NodeError::Truncated { found: 2, .. }));
}

#[test]
fn test_trailing_data_error() {
    assert!(matches!(
        decode(b"i42eextra"),
        Err(NodeError::TrailingData { offset: 4 })
    ));
}

#[test]
fn test_encode_integer() {
    assert_eq!(encode(&Node::Integer(12345)).unwrap(), b"i12345e");
    assert_eq!(encode(&Node::Integer(-42)).unwrap(), b"i-42e");
    assert_eq!(encode(&Node::Integer(0)).unwrap(), b"i0e");
}

#[test]
fn test_encode_string() {
    assert_eq!(encode(&Node::string("spam")).unwrap(), b"4:spam");
    assert_eq!(encode(&Node::string("")).unwrap(), b"0:");
}

#[test]
fn test_encode_list() {
    let list = Node::List(vec![Node::string("spam"), Node::Integer(42)]);
    assert_eq!(encode(&list).unwrap(), b"l4:spami42ee");
}

#[test]
fn test_encode_dict_sorted() {
    let mut dict = BTreeMap::new();
    dict.insert(Bytes::from_static(b"zebra"), Node::Integer(1));
    dict.insert(Bytes::from_static(b"apple"), Node::Integer(2));
    dict.insert(Bytes::from_static(b"Zulu"), Node::Integer(3));
    assert_eq!(
        encode(&Node::Dictionary(dict)).unwrap(),
        b"d4:Zului3e5:applei2e5:zebrai1ee"
    );
}

#[test]
fn test_canonical_roundtrip() {
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384eee";
    let decoded = decode(original).unwrap();
    let encoded = encode(&decoded).unwrap();
    assert_eq!(encoded, original);
    assert_eq!(decode(&encoded).unwrap(), decoded);
}

#[test]
fn test_reparse_of_unsorted_input() {
    let unsorted = b"d4:spaml1:a1:bi-3ee3:cowd1:xi0eee";
    let first = decode(unsorted).unwrap();
    let rewritten = encode(&first).unwrap();
    assert_ne!(&rewritten[..], &unsorted[..]);
    assert_eq!(decode(&rewritten).unwrap(), first);
}

#[test]
fn test_node_accessors() {
    let node = Node::Integer(42);
    assert_eq!(node.as_integer(), Some(42));
    assert!(node.as_bytes().is_none());
    assert_eq!(node.kind(), NodeKind::Integer);

    let node = Node::string("test");
    assert_eq!(node.as_str(), Some("test"));
    assert!(node.as_integer().is_none());

    let node = Node::List(vec![]);
    assert!(node.as_list().is_some());
    assert!(node.as_dict().is_none());
    assert!(node.into_dict().is_none());
}

#[test]
fn test_unbounded_limits() {
    let deep = format!("{}i1e{}", "l".repeat(100), "e".repeat(100));
    assert_eq!(decode(deep.as_bytes()).unwrap_err().kind(), ErrorKind::Limit);

    let mut parser = Parser::with_limits(deep.as_bytes(), Limits::unbounded());
    assert_eq!(parser.limits().max_depth, usize::MAX);
    assert!(parser.scan_required().is_ok());
}
