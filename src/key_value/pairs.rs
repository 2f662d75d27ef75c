use super::schema::{KeyValueComponent, KeyValuePairComponentEncodeSet, KeyValueSchema};
use crate::compat::{String, Vec};
use crate::error::ExceedsMaximumSize;
use crate::percent;
use crate::url_storage::UrlStorage;
use core::ops::Range;

/// Cursor identifying one key-value pair inside a component.
///
/// An index records where a pair's bytes live *right now*: any mutation of
/// the view shifts bytes around and invalidates every previously handed-out
/// index. Indices are stamped with the storage's edit counter, and using a
/// stale one traps rather than reading the wrong pair.
///
/// Equality and ordering compare the pair's starting offset only.
#[derive(Debug, Clone, Copy)]
pub struct PairIndex {
    start: u32,
    end: u32,
    /// Offset of the first key-value delimiter in the pair; `end` if none.
    kv: u32,
    generation: u32,
}

impl PairIndex {
    /// Byte range of the whole pair (excluding any trailing pair delimiter).
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Byte range of the key, as written.
    #[inline]
    pub fn key_range(&self) -> Range<usize> {
        self.start as usize..self.kv as usize
    }

    /// Byte range of the value, as written; empty when the pair has no
    /// key-value delimiter.
    #[inline]
    pub fn value_range(&self) -> Range<usize> {
        if self.kv < self.end {
            self.kv as usize + 1..self.end as usize
        } else {
            self.end as usize..self.end as usize
        }
    }
}

impl PartialEq for PairIndex {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
    }
}

impl Eq for PairIndex {}

impl PartialOrd for PairIndex {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PairIndex {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.start.cmp(&other.start)
    }
}

/// The shared read machinery: a borrowed snapshot of the component content.
struct RawPairs<'a, S> {
    serialization: &'a str,
    content: Range<u32>,
    component: KeyValueComponent,
    schema: &'a S,
    generation: u32,
}

impl<'a, S: KeyValueSchema> RawPairs<'a, S> {
    #[inline]
    fn bytes(&self) -> &'a [u8] {
        self.serialization.as_bytes()
    }

    fn end_index(&self) -> PairIndex {
        PairIndex {
            start: self.content.end,
            end: self.content.end,
            kv: self.content.end,
            generation: self.generation,
        }
    }

    /// First pair at or after `from`, skipping empty pairs (runs of pair
    /// delimiters), or the end index.
    fn scan_from(&self, from: u32) -> PairIndex {
        let bytes = self.bytes();
        let end = self.content.end;
        let mut lo = from.max(self.content.start);
        while lo < end && self.schema.is_pair_delimiter(bytes[lo as usize]) {
            lo += 1;
        }
        if lo >= end {
            return self.end_index();
        }
        let mut kv = None;
        let mut i = lo;
        while i < end && !self.schema.is_pair_delimiter(bytes[i as usize]) {
            if kv.is_none() && self.schema.is_kv_delimiter(bytes[i as usize]) {
                kv = Some(i);
            }
            i += 1;
        }
        PairIndex {
            start: lo,
            end: i,
            kv: kv.unwrap_or(i),
            generation: self.generation,
        }
    }

    fn index_after(&self, index: &PairIndex) -> PairIndex {
        self.scan_from(index.end.saturating_add(1))
    }

    fn decode(&self, range: Range<usize>) -> String {
        let set = KeyValuePairComponentEncodeSet::new(self.schema, self.component);
        percent::percent_decode(&self.bytes()[range], set)
            .decode_utf8_lossy()
            .into_owned()
    }

    fn pair_at(&self, index: &PairIndex) -> (String, String) {
        (
            self.decode(index.key_range()),
            self.decode(index.value_range()),
        )
    }

    fn find(&self, key: &str) -> Option<PairIndex> {
        let mut index = self.scan_from(self.content.start);
        while index.start < self.content.end {
            if self.decode(index.key_range()) == key {
                return Some(index);
            }
            index = self.index_after(&index);
        }
        None
    }

    fn all_values(&self, key: &str) -> Vec<String> {
        let mut values = Vec::new();
        let mut index = self.scan_from(self.content.start);
        while index.start < self.content.end {
            if self.decode(index.key_range()) == key {
                values.push(self.decode(index.value_range()));
            }
            index = self.index_after(&index);
        }
        values
    }

    /// Resolve up to `N` keys in one pass over the list. Each key takes the
    /// value of its first occurrence; the pass stops early once every key
    /// has resolved.
    fn get_batch<const N: usize>(&self, keys: [&str; N]) -> [Option<String>; N] {
        let mut results: [Option<String>; N] = core::array::from_fn(|_| None);
        let mut remaining = N;
        let mut index = self.scan_from(self.content.start);
        while index.start < self.content.end && remaining > 0 {
            let decoded_key = self.decode(index.key_range());
            for (slot, key) in results.iter_mut().zip(keys) {
                if slot.is_none() && decoded_key == key {
                    *slot = Some(self.decode(index.value_range()));
                    remaining -= 1;
                    break;
                }
            }
            index = self.index_after(&index);
        }
        results
    }
}

/// Iterator over the decoded pairs of a view, in byte order.
pub struct Pairs<'a, S> {
    raw: RawPairs<'a, S>,
    next: PairIndex,
}

impl<S: KeyValueSchema> Iterator for Pairs<'_, S> {
    type Item = (String, String);

    fn next(&mut self) -> Option<(String, String)> {
        if self.next.start >= self.raw.content.end {
            return None;
        }
        let pair = self.raw.pair_at(&self.next);
        self.next = self.raw.index_after(&self.next);
        Some(pair)
    }
}

impl<S: KeyValueSchema> core::iter::FusedIterator for Pairs<'_, S> {}

fn content_range(storage: &UrlStorage, component: KeyValueComponent) -> Range<u32> {
    match storage.range_of(component.component()) {
        Some(range) => (range.start as u32 + 1)..(range.end as u32),
        None => {
            let structure = storage.structure();
            let position = match component {
                KeyValueComponent::Query => structure.query_start(),
                KeyValueComponent::Fragment => structure.fragment_start(),
            } as u32;
            position..position
        }
    }
}

macro_rules! read_api {
    () => {
        /// The first pair, skipping empty pairs; equals
        /// [`end_index`](Self::end_index) when the list is empty.
        pub fn start_index(&self) -> PairIndex {
            self.start
        }

        /// The past-the-end cursor.
        pub fn end_index(&self) -> PairIndex {
            self.raw().end_index()
        }

        /// The pair after `index`, skipping empty pairs.
        pub fn index_after(&self, index: &PairIndex) -> PairIndex {
            self.check_index(index);
            self.raw().index_after(index)
        }

        /// The decoded key and value at `index`.
        pub fn pair_at(&self, index: &PairIndex) -> (String, String) {
            self.check_pair_index(index);
            self.raw().pair_at(index)
        }

        /// The key bytes at `index`, exactly as written in the URL.
        pub fn raw_key_at(&self, index: &PairIndex) -> &str {
            self.check_pair_index(index);
            &self.storage.as_str()[index.key_range()]
        }

        /// The value bytes at `index`, exactly as written in the URL.
        pub fn raw_value_at(&self, index: &PairIndex) -> &str {
            self.check_pair_index(index);
            &self.storage.as_str()[index.value_range()]
        }

        /// The index of the first pair whose decoded key equals `key`.
        pub fn find(&self, key: &str) -> Option<PairIndex> {
            self.raw().find(key)
        }

        /// The decoded value of the first pair whose decoded key equals
        /// `key`.
        pub fn get(&self, key: &str) -> Option<String> {
            let raw = self.raw();
            raw.find(key).map(|index| raw.decode(index.value_range()))
        }

        /// All values for `key`, in document order.
        pub fn all_values(&self, key: &str) -> Vec<String> {
            self.raw().all_values(key)
        }

        /// Resolve several keys in a single pass; each key takes its first
        /// occurrence and the pass stops once all of them have resolved.
        pub fn get_batch<const N: usize>(&self, keys: [&str; N]) -> [Option<String>; N] {
            self.raw().get_batch(keys)
        }

        /// Iterate the decoded pairs in byte order.
        pub fn iter(&self) -> Pairs<'_, S> {
            let raw = self.raw();
            let next = raw.scan_from(raw.content.start);
            Pairs { raw, next }
        }

        /// Iterate the decoded keys in byte order.
        pub fn keys(&self) -> impl Iterator<Item = String> + '_ {
            self.iter().map(|(key, _)| key)
        }

        /// Iterate the decoded values in byte order.
        pub fn values(&self) -> impl Iterator<Item = String> + '_ {
            self.iter().map(|(_, value)| value)
        }

        /// Whether the list holds no pairs.
        pub fn is_empty(&self) -> bool {
            self.start.start >= self.content.end
        }

        fn check_index(&self, index: &PairIndex) {
            assert!(
                index.generation == self.generation(),
                "key-value pair index used after a mutation"
            );
            debug_assert!(index.start <= self.content.end && index.end <= self.content.end);
        }

        fn check_pair_index(&self, index: &PairIndex) {
            self.check_index(index);
            assert!(
                index.start < index.end,
                "index does not address a pair"
            );
        }
    };
}

/// Read-only list-of-pairs view over a URL component.
///
/// Interprets the component's bytes as a key-value list under a
/// [`KeyValueSchema`]. Iteration order is byte order; empty pairs (runs of
/// pair delimiters) are skipped.
pub struct KeyValuePairs<'u, S> {
    storage: &'u UrlStorage,
    component: KeyValueComponent,
    schema: S,
    content: Range<u32>,
    start: PairIndex,
}

impl<'u, S: KeyValueSchema> KeyValuePairs<'u, S> {
    pub(crate) fn new(storage: &'u UrlStorage, component: KeyValueComponent, schema: S) -> Self {
        let verified = schema.verify(component);
        assert!(
            verified.is_ok(),
            "key-value schema failed verification: {verified:?}"
        );
        let content = content_range(storage, component);
        let mut view = Self {
            storage,
            component,
            schema,
            content,
            start: PairIndex {
                start: 0,
                end: 0,
                kv: 0,
                generation: storage.edit_count(),
            },
        };
        let start = view.raw().scan_from(view.content.start);
        view.start = start;
        view
    }

    fn generation(&self) -> u32 {
        self.storage.edit_count()
    }

    fn raw(&self) -> RawPairs<'_, S> {
        RawPairs {
            serialization: self.storage.as_str(),
            content: self.content.clone(),
            component: self.component,
            schema: &self.schema,
            generation: self.generation(),
        }
    }

    read_api!();
}

impl<'v, S: KeyValueSchema> IntoIterator for &'v KeyValuePairs<'_, S> {
    type Item = (String, String);
    type IntoIter = Pairs<'v, S>;

    fn into_iter(self) -> Pairs<'v, S> {
        self.iter()
    }
}

/// Mutable list-of-pairs view over a URL component.
///
/// Every mutation invalidates all previously handed-out [`PairIndex`] values
/// and returns freshly computed ones. Inserted keys and values are escaped
/// through the per-component encode set derived from the schema, so written
/// text can never forge a delimiter or an escape.
///
/// The only recoverable failure is [`ExceedsMaximumSize`], in which case the
/// URL is left unchanged.
pub struct KeyValuePairsMut<'u, S> {
    storage: &'u mut UrlStorage,
    component: KeyValueComponent,
    schema: S,
    content: Range<u32>,
    start: PairIndex,
}

impl<'u, S: KeyValueSchema> KeyValuePairsMut<'u, S> {
    pub(crate) fn new(
        storage: &'u mut UrlStorage,
        component: KeyValueComponent,
        schema: S,
    ) -> Self {
        let verified = schema.verify(component);
        assert!(
            verified.is_ok(),
            "key-value schema failed verification: {verified:?}"
        );
        let content = content_range(storage, component);
        let mut view = Self {
            storage,
            component,
            schema,
            content,
            start: PairIndex {
                start: 0,
                end: 0,
                kv: 0,
                generation: 0,
            },
        };
        view.refresh();
        if view.component == KeyValueComponent::Query
            && view.schema.is_known_form_encoded()
            && !view.storage.structure().query_is_known_form_encoded
        {
            view.canonicalize_query();
        }
        view
    }

    fn generation(&self) -> u32 {
        self.storage.edit_count()
    }

    fn raw(&self) -> RawPairs<'_, S> {
        RawPairs {
            serialization: self.storage.as_str(),
            content: self.content.clone(),
            component: self.component,
            schema: &self.schema,
            generation: self.generation(),
        }
    }

    read_api!();

    /// Recompute the cached content range and start index from the storage.
    fn refresh(&mut self) {
        self.content = content_range(self.storage, self.component);
        let start = self.raw().scan_from(self.content.start);
        self.start = start;
    }

    fn component_set(&self) -> KeyValuePairComponentEncodeSet<'_, S> {
        KeyValuePairComponentEncodeSet::new(&self.schema, self.component)
    }

    /// Whether `position` sits between pairs: the content boundary or just
    /// past a pair delimiter.
    fn is_pair_boundary(&self, position: u32) -> bool {
        position == self.content.start
            || position == self.content.end
            || (position > self.content.start
                && self
                    .schema
                    .is_pair_delimiter(self.storage.as_str().as_bytes()[position as usize - 1]))
    }

    /// Splice `replacement` over an absolute byte range, keep the structure
    /// in step, and refresh the caches. All mutations funnel through here.
    fn splice_raw(
        &mut self,
        range: Range<usize>,
        replacement: &str,
    ) -> Result<(), ExceedsMaximumSize> {
        let delta = replacement.len() as i64 - range.len() as i64;
        let mut structure = *self.storage.structure();
        match self.component {
            KeyValueComponent::Query => {
                let new_len = i64::from(structure.query_len) + delta;
                if !(0..=i64::from(u32::MAX)).contains(&new_len) {
                    return Err(ExceedsMaximumSize);
                }
                structure.query_len = new_len as u32;
                structure.query_is_known_form_encoded =
                    new_len <= 1 || self.schema.is_known_form_encoded();
            }
            KeyValueComponent::Fragment => {
                let new_len = i64::from(structure.fragment_len) + delta;
                if !(0..=i64::from(u32::MAX)).contains(&new_len) {
                    return Err(ExceedsMaximumSize);
                }
                structure.fragment_len = new_len as u32;
            }
        }
        self.storage.replace_subrange(range, replacement, structure)?;
        self.refresh();
        Ok(())
    }

    /// The mutation primitive: replace the pairs covering content bytes
    /// `[lo, hi)` with freshly encoded `pairs`, stitching delimiters at both
    /// seams and adding or dropping the component's leading delimiter as the
    /// component comes and goes.
    fn splice_pairs<I, K, V>(
        &mut self,
        lo: u32,
        hi: u32,
        pairs: I,
    ) -> Result<Range<PairIndex>, ExceedsMaximumSize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let set = self.component_set();
        let pair_delimiter = self.schema.preferred_pair_delimiter() as char;
        let kv_delimiter = self.schema.preferred_kv_delimiter() as char;

        let mut body = String::new();
        for (key, value) in pairs {
            if !body.is_empty() {
                body.push(pair_delimiter);
            }
            percent::utf8_percent_encode(key.as_ref(), &set).append_to(&mut body);
            body.push(kv_delimiter);
            percent::utf8_percent_encode(value.as_ref(), &set).append_to(&mut body);
        }

        let content = self.content.clone();
        let component_absent = self
            .storage
            .range_of(self.component.component())
            .is_none();

        let mut splice_lo = lo as usize;
        let splice_hi = hi as usize;
        let mut replacement = String::new();
        let mut prefix_len = 0usize;

        if body.is_empty() {
            if splice_hi == content.end as usize && splice_lo < splice_hi {
                if splice_lo > content.start as usize {
                    // Keep the component from ending with a dangling
                    // delimiter.
                    splice_lo -= 1;
                } else if !component_absent {
                    // Everything goes, including the leading '?' / '#'.
                    splice_lo -= 1;
                }
            }
        } else {
            if component_absent {
                replacement.push(self.component.leading_delimiter());
                prefix_len = 1;
            } else if splice_lo == content.end as usize
                && content.end > content.start
                && !self
                    .schema
                    .is_pair_delimiter(self.storage.as_str().as_bytes()[splice_lo - 1])
            {
                replacement.push(pair_delimiter);
                prefix_len = 1;
            }
            replacement.push_str(&body);
            if splice_hi < content.end as usize {
                replacement.push(pair_delimiter);
            }
        }

        self.splice_raw(splice_lo..splice_hi, &replacement)?;

        if body.is_empty() {
            let position = self.raw().scan_from(splice_lo as u32);
            Ok(position..position)
        } else {
            let first = self.raw().scan_from((splice_lo + prefix_len) as u32);
            let after = self
                .raw()
                .scan_from((splice_lo + prefix_len + body.len()) as u32);
            Ok(first..after)
        }
    }

    /// Resolve a caller-supplied range into snapped, boundary-checked
    /// content offsets.
    fn resolve_bounds(&self, bounds: &Range<PairIndex>) -> (u32, u32) {
        self.check_index(&bounds.start);
        self.check_index(&bounds.end);
        let mut lo = bounds.start.start;
        let hi = bounds.end.start;
        assert!(lo <= hi, "inverted pair range");
        if lo == self.start.start {
            // Replacing from the first pair also replaces any stale prefix
            // of empty pairs.
            lo = self.content.start;
        } else {
            assert!(
                self.is_pair_boundary(lo),
                "range start is not at a pair boundary"
            );
        }
        if hi != self.content.end {
            assert!(
                self.is_pair_boundary(hi),
                "range end is not at a pair boundary"
            );
        }
        (lo, hi)
    }

    /// Replace the pairs in `bounds` with `pairs`.
    ///
    /// Returns the range covering the inserted pairs, or an empty range at
    /// the new location of `bounds.end` if nothing was inserted. Both
    /// endpoints must previously have been handed out by this view and must
    /// still be current.
    pub fn replace_subrange<I, K, V>(
        &mut self,
        bounds: Range<PairIndex>,
        pairs: I,
    ) -> Result<Range<PairIndex>, ExceedsMaximumSize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let (lo, hi) = self.resolve_bounds(&bounds);
        self.splice_pairs(lo, hi, pairs)
    }

    /// Insert `pairs` before the pair at `index`.
    pub fn insert_pairs<I, K, V>(
        &mut self,
        index: PairIndex,
        pairs: I,
    ) -> Result<Range<PairIndex>, ExceedsMaximumSize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.replace_subrange(index..index, pairs)
    }

    /// Insert one pair before the pair at `index` and return its index.
    pub fn insert(
        &mut self,
        index: PairIndex,
        key: &str,
        value: &str,
    ) -> Result<PairIndex, ExceedsMaximumSize> {
        self.insert_pairs(index, [(key, value)]).map(|r| r.start)
    }

    /// Append `pairs` at the end of the list.
    pub fn append_pairs<I, K, V>(&mut self, pairs: I) -> Result<Range<PairIndex>, ExceedsMaximumSize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let end = self.end_index();
        self.replace_subrange(end..end, pairs)
    }

    /// Append one pair and return its index.
    pub fn append(&mut self, key: &str, value: &str) -> Result<PairIndex, ExceedsMaximumSize> {
        self.append_pairs([(key, value)]).map(|r| r.start)
    }

    /// Append map-like entries, sorted by key so the output is deterministic
    /// regardless of the map's iteration order.
    pub fn append_map<I, K, V>(&mut self, entries: I) -> Result<Range<PairIndex>, ExceedsMaximumSize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut sorted: Vec<(K, V)> = entries.into_iter().collect();
        sorted.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));
        self.append_pairs(sorted)
    }

    /// Remove the pair at `index`; returns the index of the pair that
    /// followed it.
    pub fn remove(&mut self, index: PairIndex) -> Result<PairIndex, ExceedsMaximumSize> {
        self.check_pair_index(&index);
        let next = self.index_after(&index);
        self.remove_subrange(index..next)
    }

    /// Remove the pairs in `bounds`; returns the index of the pair after the
    /// removed run.
    ///
    /// Removing through the end of the content also drops the pair delimiter
    /// before the removed run; removing everything drops the component's
    /// leading `?` / `#` too, leaving the component absent rather than
    /// empty.
    pub fn remove_subrange(
        &mut self,
        bounds: Range<PairIndex>,
    ) -> Result<PairIndex, ExceedsMaximumSize> {
        let empty: [(&str, &str); 0] = [];
        self.replace_subrange(bounds, empty).map(|r| r.start)
    }

    /// Replace the key of the pair at `index`, re-encoding the new key;
    /// returns the pair's updated index.
    ///
    /// Writing an empty key over a pair that had neither delimiter nor value
    /// inserts the key-value delimiter, so the pair survives as an
    /// empty-key, empty-value pair instead of vanishing.
    pub fn replace_key(
        &mut self,
        index: PairIndex,
        new_key: &str,
    ) -> Result<PairIndex, ExceedsMaximumSize> {
        self.check_pair_index(&index);
        let set = self.component_set();
        let mut encoded = percent::utf8_percent_encode(new_key, &set).to_string();
        if encoded.is_empty() && index.kv == index.end {
            encoded.push(self.schema.preferred_kv_delimiter() as char);
        }
        self.splice_raw(index.start as usize..index.kv as usize, &encoded)?;
        Ok(self.raw().scan_from(index.start))
    }

    /// Replace the value of the pair at `index`, re-encoding the new value;
    /// returns the pair's updated index. Inserts the key-value delimiter if
    /// the pair had none and the new value is non-empty.
    pub fn replace_value(
        &mut self,
        index: PairIndex,
        new_value: &str,
    ) -> Result<PairIndex, ExceedsMaximumSize> {
        self.check_pair_index(&index);
        let set = self.component_set();
        let encoded = percent::utf8_percent_encode(new_value, &set).to_string();
        let (range, mut replacement) = if index.kv < index.end {
            (index.value_range(), String::new())
        } else if encoded.is_empty() {
            // No delimiter, no value to write: leave the pair as-is.
            (index.end as usize..index.end as usize, String::new())
        } else {
            let mut prefix = String::new();
            prefix.push(self.schema.preferred_kv_delimiter() as char);
            (index.end as usize..index.end as usize, prefix)
        };
        replacement.push_str(&encoded);
        self.splice_raw(range, &replacement)?;
        Ok(self.raw().scan_from(index.start))
    }

    /// Remove every pair in `bounds` whose decoded key and value match
    /// `predicate`, in a single pass. Empty pairs in the range are removed
    /// along the way; a removal that reaches the end of the content trims
    /// the trailing delimiter, and removing everything removes the
    /// component's leading delimiter too.
    pub fn remove_all_in_range_where<F>(
        &mut self,
        bounds: Range<PairIndex>,
        mut predicate: F,
    ) -> Result<(), ExceedsMaximumSize>
    where
        F: FnMut(&str, &str) -> bool,
    {
        let (lo, hi) = self.resolve_bounds(&bounds);
        let pair_delimiter = self.schema.preferred_pair_delimiter() as char;

        let mut kept = String::new();
        {
            let raw = self.raw();
            let mut index = raw.scan_from(lo);
            while index.start < hi {
                let (key, value) = raw.pair_at(&index);
                if !predicate(&key, &value) {
                    if !kept.is_empty() {
                        kept.push(pair_delimiter);
                    }
                    kept.push_str(&raw.serialization[index.range()]);
                }
                index = raw.index_after(&index);
            }
        }

        let content = self.content.clone();
        let component_absent = self
            .storage
            .range_of(self.component.component())
            .is_none();
        let mut splice_lo = lo as usize;
        let splice_hi = hi as usize;
        if kept.is_empty() {
            if splice_hi == content.end as usize && splice_lo < splice_hi {
                if splice_lo > content.start as usize {
                    splice_lo -= 1;
                } else if !component_absent {
                    splice_lo -= 1;
                }
            }
        } else if splice_hi < content.end as usize {
            kept.push(pair_delimiter);
        }
        self.splice_raw(splice_lo..splice_hi, &kept)
    }

    /// [`remove_all_in_range_where`](Self::remove_all_in_range_where) over
    /// the whole list.
    pub fn remove_all_where<F>(&mut self, predicate: F) -> Result<(), ExceedsMaximumSize>
    where
        F: FnMut(&str, &str) -> bool,
    {
        let bounds = self.start_index()..self.end_index();
        self.remove_all_in_range_where(bounds, predicate)
    }

    /// Key-based assignment.
    ///
    /// `set(key, Some(value))` updates the first matching pair in place and
    /// removes any later pairs with the same key, or appends when no pair
    /// matches. `set(key, None)` removes every matching pair. Other keys are
    /// untouched either way.
    pub fn set(&mut self, key: &str, value: Option<&str>) -> Result<(), ExceedsMaximumSize> {
        match value {
            Some(value) => {
                if let Some(first) = self.find(key) {
                    let updated = self.replace_value(first, value)?;
                    let after = self.index_after(&updated);
                    let end = self.end_index();
                    if after.start < end.start {
                        self.remove_all_in_range_where(after..end, |k, _| k == key)?;
                    }
                    Ok(())
                } else {
                    self.append(key, value).map(|_| ())
                }
            }
            None => self.remove_all_where(|k, _| k == key),
        }
    }

    /// Decode every pair of a not-yet-canonical query with this schema's
    /// read rules and rewrite the whole query in canonical form-encoded
    /// bytes. Runs once, when the view is created; afterwards the structure
    /// flag records that the query is canonical and edits stay incremental.
    fn canonicalize_query(&mut self) {
        let set = self.component_set();
        let pair_delimiter = self.schema.preferred_pair_delimiter() as char;
        let kv_delimiter = self.schema.preferred_kv_delimiter() as char;

        let mut body = String::new();
        {
            let raw = self.raw();
            let mut index = raw.scan_from(raw.content.start);
            while index.start < raw.content.end {
                let key: Vec<u8> =
                    percent::percent_decode(&raw.bytes()[index.key_range()], set).collect_bytes();
                let value: Vec<u8> =
                    percent::percent_decode(&raw.bytes()[index.value_range()], set)
                        .collect_bytes();
                if !body.is_empty() {
                    body.push(pair_delimiter);
                }
                percent::percent_encode(&key, &set).append_to(&mut body);
                body.push(kv_delimiter);
                percent::percent_encode(&value, &set).append_to(&mut body);
                index = raw.index_after(&index);
            }
        }

        let range = self.content.start as usize - 1..self.content.end as usize;
        let mut replacement = String::new();
        if !body.is_empty() {
            replacement.push(self.component.leading_delimiter());
            replacement.push_str(&body);
        }
        // Canonicalization can only fail by overflowing the maximum size; in
        // that case the query is left as it was and the flag stays false.
        let _ = self.splice_raw(range, &replacement);
    }
}

#[cfg(test)]
mod tests {
    use super::super::schema::PercentEncoded;
    use super::*;
    use crate::compat::ToString;

    fn storage(input: &str) -> UrlStorage {
        match UrlStorage::from_well_formed(input) {
            Ok(url) => url,
            Err(e) => unreachable!("{input}: {e}"),
        }
    }

    #[test]
    fn test_scan_skips_empty_pairs() {
        let url = storage("http://example.com/?&&a=1&&b=2&&");
        let pairs = url.key_value_pairs(KeyValueComponent::Query, PercentEncoded);
        let collected: Vec<(String, String)> = pairs.iter().collect();
        assert_eq!(
            collected,
            [
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
    }

    #[test]
    fn test_pair_without_delimiter() {
        let url = storage("http://example.com/?flag&x=1");
        let pairs = url.query_pairs();
        let index = pairs.start_index();
        assert_eq!(pairs.pair_at(&index), ("flag".to_string(), String::new()));
        assert_eq!(pairs.raw_key_at(&index), "flag");
        assert_eq!(pairs.raw_value_at(&index), "");
    }

    #[test]
    fn test_index_ordering() {
        let url = storage("http://example.com/?a=1&b=2");
        let pairs = url.query_pairs();
        let first = pairs.start_index();
        let second = pairs.index_after(&first);
        assert!(first < second);
        assert_eq!(second, pairs.index_after(&first));
    }

    #[test]
    fn test_fragment_component() {
        let mut url = storage("http://example.com/#a=1&b=2");
        {
            let pairs = url.key_value_pairs(KeyValueComponent::Fragment, PercentEncoded);
            assert_eq!(pairs.get("b"), Some("2".to_string()));
        }
        let mut pairs = url.key_value_pairs_mut(KeyValueComponent::Fragment, PercentEncoded);
        assert!(pairs.set("c", Some("3")).is_ok());
        assert_eq!(url.as_str(), "http://example.com/#a=1&b=2&c=3");
    }

    #[test]
    fn test_canonicalization_is_lazy_for_reads() {
        let url = storage("http://example.com/?q=a+b");
        assert_eq!(url.query_pairs().get("q"), Some("a b".to_string()));
        // Read views never rewrite the URL.
        assert_eq!(url.as_str(), "http://example.com/?q=a+b");
    }

    #[test]
    fn test_mut_view_canonicalizes_once() {
        let mut url = storage("http://example.com/?q=a+b&&x=%41");
        let _ = url.query_pairs_mut();
        assert_eq!(url.as_str(), "http://example.com/?q=a%20b&x=A");
        assert!(url.structure().query_is_known_form_encoded);
    }

    #[test]
    #[should_panic(expected = "index used after a mutation")]
    fn test_stale_index_traps() {
        let mut url = storage("http://example.com/?a=1&b=2");
        let mut pairs = url.query_pairs_mut();
        let stale = pairs.start_index();
        let _ = pairs.append("c", "3");
        let _ = pairs.pair_at(&stale);
    }
}
