#![allow(clippy::unwrap_used, clippy::panic, clippy::expect_used)]

//! Key-value view tests: reading, key lookup, every mutation, ordering
//! guarantees, and a differential check of the form-encoded read path
//! against the `form_urlencoded` crate.

use urlbuf::UrlStorage;
use urlbuf::key_value::{KeyValueComponent, PercentEncoded};

fn storage(input: &str) -> UrlStorage {
    UrlStorage::from_well_formed(input).unwrap()
}

fn pairs_of(url: &UrlStorage) -> Vec<(String, String)> {
    url.query_pairs().iter().collect()
}

#[test]
fn batched_lookup() {
    let url = storage("http://example.com/?category=shoes&page=4&num=20");
    let [category, page, num] = url.query_pairs().get_batch(["category", "page", "num"]);
    assert_eq!(category.as_deref(), Some("shoes"));
    assert_eq!(page.as_deref(), Some("4"));
    assert_eq!(num.as_deref(), Some("20"));

    // Missing keys stay unresolved; present keys take their first occurrence.
    let [page, missing] = url.query_pairs().get_batch(["page", "absent"]);
    assert_eq!(page.as_deref(), Some("4"));
    assert_eq!(missing, None);
}

#[test]
fn set_by_key() {
    let mut url = storage("http://example.com/?q=quick+recipes&start=10&limit=20");
    let mut pairs = url.query_pairs_mut();
    pairs.set("q", Some("some query")).unwrap();
    pairs.set("safe", Some("on")).unwrap();
    pairs.set("limit", None).unwrap();
    assert_eq!(
        url.as_str(),
        "http://example.com/?q=some%20query&start=10&safe=on"
    );
}

#[test]
fn insert_in_the_middle() {
    let mut url = storage("http://example/students?class=8&sort=age");
    let mut pairs = url.query_pairs_mut();
    let at = pairs.find("sort").unwrap();
    pairs.insert(at, "sort", "name").unwrap();
    assert_eq!(
        url.as_str(),
        "http://example/students?class=8&sort=name&sort=age"
    );
    assert_eq!(url.query_pairs().all_values("sort"), ["name", "age"]);
}

#[test]
fn bulk_append_creates_the_component() {
    let mut url = storage("http://example.com/convert");
    url.query_pairs_mut()
        .append_pairs([("amount", "200"), ("from", "EUR"), ("to", "GBP")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "http://example.com/convert?amount=200&from=EUR&to=GBP"
    );
}

#[test]
fn remove_all_with_predicate() {
    let mut url =
        storage("http://example/p?sort=new&utm_source=swift.org&utm_campaign=example&version=2");
    url.query_pairs_mut()
        .remove_all_where(|key, _| key.starts_with("utm_"))
        .unwrap();
    assert_eq!(url.as_str(), "http://example/p?sort=new&version=2");
}

#[test]
fn iteration_order_is_byte_order_and_stable() {
    let url = storage("http://example.com/?b=2&a=1&b=3");
    let first: Vec<(String, String)> = pairs_of(&url);
    let second: Vec<(String, String)> = pairs_of(&url);
    assert_eq!(first, second);
    assert_eq!(
        first,
        [
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "3".to_string()),
        ]
    );
}

#[test]
fn mutations_preserve_unaffected_pairs() {
    let mut url = storage("http://example.com/?one=1&two=2&three=3&four=4");
    let before = pairs_of(&url);

    let mut pairs = url.query_pairs_mut();
    let target = pairs.find("two").unwrap();
    pairs.remove(target).unwrap();

    let after = pairs_of(&url);
    let expected: Vec<(String, String)> = before
        .into_iter()
        .filter(|(key, _)| key != "two")
        .collect();
    assert_eq!(after, expected);
}

#[test]
fn subscript_semantics() {
    let mut url = storage("http://example.com/?a=1&b=2&a=3");
    let mut pairs = url.query_pairs_mut();

    // Setting replaces the first match and drops later duplicates.
    pairs.set("a", Some("9")).unwrap();
    assert_eq!(pairs.get("a").as_deref(), Some("9"));
    assert_eq!(pairs.all_values("a"), ["9"]);
    assert_eq!(pairs.get("b").as_deref(), Some("2"));

    // Removing by key drops every match and nothing else.
    pairs.set("a", None).unwrap();
    assert_eq!(pairs.get("a"), None);
    assert_eq!(pairs.get("b").as_deref(), Some("2"));
    assert_eq!(url.as_str(), "http://example.com/?b=2");
}

#[test]
fn removing_the_last_pair_removes_the_component() {
    let mut url = storage("http://example.com/page?only=1#frag");
    url.query_pairs_mut().set("only", None).unwrap();
    assert_eq!(url.as_str(), "http://example.com/page#frag");
    assert_eq!(url.query(), None);
    assert!(url.structure().query_is_known_form_encoded);
}

#[test]
fn removing_through_the_end_trims_the_delimiter() {
    let mut url = storage("http://example.com/?a=1&b=2&c=3");
    let mut pairs = url.query_pairs_mut();
    let b = pairs.find("b").unwrap();
    let end = pairs.end_index();
    pairs.remove_subrange(b..end).unwrap();
    assert_eq!(url.as_str(), "http://example.com/?a=1");
}

#[test]
fn replace_subrange_returns_inserted_range() {
    let mut url = storage("http://example.com/?a=1&b=2&c=3");
    let mut pairs = url.query_pairs_mut();
    let b = pairs.find("b").unwrap();
    let c = pairs.find("c").unwrap();
    let inserted = pairs
        .replace_subrange(b..c, [("x", "8"), ("y", "9")])
        .unwrap();
    let collected: Vec<(String, String)> = {
        let mut items = Vec::new();
        let mut index = inserted.start;
        while index < inserted.end {
            items.push(pairs.pair_at(&index));
            index = pairs.index_after(&index);
        }
        items
    };
    assert_eq!(
        collected,
        [
            ("x".to_string(), "8".to_string()),
            ("y".to_string(), "9".to_string())
        ]
    );
    assert_eq!(url.as_str(), "http://example.com/?a=1&x=8&y=9&c=3");
}

#[test]
fn replace_key_and_value() {
    // The percent-encoded schema leaves the bare pair alone, so this
    // exercises the delimiter-inserting paths.
    let mut url = storage("http://example.com/?flag&k=v");
    let mut pairs = url.key_value_pairs_mut(KeyValueComponent::Query, PercentEncoded);

    // Giving a bare pair a value inserts the '='.
    let flag = pairs.start_index();
    let flag = pairs.replace_value(flag, "on").unwrap();
    assert_eq!(pairs.pair_at(&flag), ("flag".to_string(), "on".to_string()));
    assert_eq!(url.query(), Some("flag=on&k=v"));

    let mut pairs = url.key_value_pairs_mut(KeyValueComponent::Query, PercentEncoded);
    let k = pairs.find("k").unwrap();
    let renamed = pairs.replace_key(k, "key with space").unwrap();
    assert_eq!(
        pairs.pair_at(&renamed),
        ("key with space".to_string(), "v".to_string())
    );
    assert_eq!(url.query(), Some("flag=on&key%20with%20space=v"));
}

#[test]
fn replacing_key_of_bare_pair_with_empty_keeps_the_pair() {
    let mut url = storage("http://example.com/?token&x=1");
    let mut pairs = url.key_value_pairs_mut(KeyValueComponent::Query, PercentEncoded);
    let bare = pairs.start_index();
    let kept = pairs.replace_key(bare, "").unwrap();
    assert_eq!(pairs.pair_at(&kept), (String::new(), String::new()));
    assert_eq!(url.query(), Some("=&x=1"));
}

#[test]
fn append_map_sorts_by_key() {
    let mut url = storage("http://example.com/search");
    let entries = std::collections::HashMap::from([
        ("zebra", "1"),
        ("apple", "2"),
        ("mango", "3"),
    ]);
    url.query_pairs_mut().append_map(entries).unwrap();
    assert_eq!(
        url.as_str(),
        "http://example.com/search?apple=2&mango=3&zebra=1"
    );
}

#[test]
fn written_text_cannot_forge_syntax() {
    let mut url = storage("http://example.com/find");
    let mut pairs = url.query_pairs_mut();
    pairs.append("q", "a=b&c=d").unwrap();
    pairs.append("p", "100%+").unwrap();
    assert_eq!(
        url.as_str(),
        "http://example.com/find?q=a%3Db%26c%3Dd&p=100%25%2B"
    );
    // Reading decodes back exactly what was written.
    assert_eq!(url.query_pairs().get("q").as_deref(), Some("a=b&c=d"));
    assert_eq!(url.query_pairs().get("p").as_deref(), Some("100%+"));
}

#[test]
fn non_form_schema_reads_plus_literally() {
    let url = storage("http://example.com/?q=a+b");
    let form = url.query_pairs();
    assert_eq!(form.get("q").as_deref(), Some("a b"));
    let plain = url.key_value_pairs(KeyValueComponent::Query, PercentEncoded);
    assert_eq!(plain.get("q").as_deref(), Some("a+b"));
}

#[test]
fn fragment_views_use_the_fragment_encode_set() {
    let mut url = storage("http://example.com/page");
    let mut pairs = url.key_value_pairs_mut(KeyValueComponent::Fragment, PercentEncoded);
    pairs.append("note", "a b`c").unwrap();
    // Space and backtick come from the fragment set; '&' and '=' from the
    // schema's delimiters.
    assert_eq!(url.as_str(), "http://example.com/page#note=a%20b%60c");
}

#[test]
fn differential_against_form_urlencoded() {
    let queries = [
        "a=1&b=2",
        "key=a+b%20c",
        "dup=1&dup=2&dup=3",
        "flag&empty=&=anon",
        "%C3%A9=caf%C3%A9&mixed=%2B+",
        "&&skip=1&&",
    ];
    for query in queries {
        let url = storage(&format!("http://example.com/?{query}"));
        let mine: Vec<(String, String)> = url.query_pairs().iter().collect();
        let theirs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(mine, theirs, "query {query:?}");
    }
}

#[test]
fn set_then_get_round_trip() {
    let mut url = storage("http://example.com/");
    let mut pairs = url.query_pairs_mut();
    for (key, value) in [("k", "v"), ("sp ace", "a+b"), ("\u{1F986}", "duck")] {
        pairs.set(key, Some(value)).unwrap();
        assert_eq!(pairs.get(key).as_deref(), Some(value), "{key}");
    }
    for (key, _) in [("k", ""), ("sp ace", ""), ("\u{1F986}", "")] {
        pairs.set(key, None).unwrap();
        assert_eq!(pairs.get(key), None);
    }
    assert_eq!(url.as_str(), "http://example.com/");
}

#[test]
#[should_panic(expected = "index used after a mutation")]
fn stale_index_after_remove_traps() {
    let mut url = storage("http://example.com/?a=1&b=2");
    let mut pairs = url.query_pairs_mut();
    let a = pairs.start_index();
    let b = pairs.index_after(&a);
    pairs.remove(a).unwrap();
    let _ = pairs.pair_at(&b);
}

#[test]
#[should_panic(expected = "key-value schema failed verification")]
fn broken_schema_traps_at_view_creation() {
    struct Hexy;
    impl urlbuf::key_value::KeyValueSchema for Hexy {
        fn preferred_pair_delimiter(&self) -> u8 {
            b'a'
        }
        fn preferred_kv_delimiter(&self) -> u8 {
            b'='
        }
        fn decode_plus_as_space(&self) -> bool {
            false
        }
    }
    let url = storage("http://example.com/?a=1");
    let _ = url.key_value_pairs(KeyValueComponent::Query, Hexy);
}

#[test]
fn custom_multi_delimiter_schema() {
    struct QueryOrSemicolon;
    impl urlbuf::key_value::KeyValueSchema for QueryOrSemicolon {
        fn preferred_pair_delimiter(&self) -> u8 {
            b'&'
        }
        fn preferred_kv_delimiter(&self) -> u8 {
            b'='
        }
        fn is_pair_delimiter(&self, byte: u8) -> bool {
            byte == b'&' || byte == b';'
        }
        fn decode_plus_as_space(&self) -> bool {
            false
        }
    }
    let url = storage("http://example.com/?a=1;b=2&c=3");
    let pairs = url.key_value_pairs(KeyValueComponent::Query, QueryOrSemicolon);
    let collected: Vec<(String, String)> = pairs.iter().collect();
    assert_eq!(
        collected,
        [
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ]
    );

    // Writing through the schema escapes everything its reader treats as a
    // delimiter, so inserted text can never split into extra pairs.
    let mut url = storage("http://example.com/");
    let mut pairs = url.key_value_pairs_mut(KeyValueComponent::Query, QueryOrSemicolon);
    pairs.append("k", "a;b&c=d").unwrap();
    assert_eq!(url.query(), Some("k=a%3Bb%26c%3Dd"));
    let pairs = url.key_value_pairs(KeyValueComponent::Query, QueryOrSemicolon);
    let collected: Vec<(String, String)> = pairs.iter().collect();
    assert_eq!(collected, [("k".to_string(), "a;b&c=d".to_string())]);
}
