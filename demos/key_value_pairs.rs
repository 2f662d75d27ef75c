/// Key-value pairs view usage example
use urlbuf::UrlStorage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut url: UrlStorage = "http://example.com/search?q=rust&page=1".parse()?;

    // Read values
    let pairs = url.query_pairs();
    println!("q: {:?}", pairs.get("q")); // Some("rust")
    println!("page: {:?}", pairs.get("page")); // Some("1")
    println!();

    // Several keys in one pass
    let [q, page, missing] = url.query_pairs().get_batch(["q", "page", "missing"]);
    println!("batched: {q:?} {page:?} {missing:?}");
    println!();

    // Update by key: first match is rewritten in place
    let mut pairs = url.query_pairs_mut();
    pairs.set("q", Some("rust urls"))?;
    pairs.set("safe", Some("on"))?;
    println!("after set: {url}"); // ...?q=rust%20urls&page=1&safe=on
    println!();

    // Insert before an existing pair
    let mut pairs = url.query_pairs_mut();
    if let Some(at) = pairs.find("safe") {
        pairs.insert(at, "lang", "en")?;
    }
    println!("after insert: {url}");
    println!();

    // Remove with a predicate
    url.query_pairs_mut()
        .remove_all_where(|key, _| key == "page")?;
    println!("after remove: {url}");
    println!();

    // Iterate over all pairs
    println!("all pairs:");
    for (key, value) in &url.query_pairs() {
        println!("  {key} = {value}");
    }
    Ok(())
}
