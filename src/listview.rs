//! Generic list-view controller: one authoritative snapshot per entity kind,
//! with a derived filtered view that is searched, sorted and paginated.
//!
//! The controller is pure state + math; rendering and network traffic live
//! elsewhere. Both entity kinds (users, groups) share this one implementation,
//! parametrized by the [`Record`] trait.

use std::cmp::Ordering;

use serde::Serialize;

/// Version tag stamped on exported snapshots.
pub const EXPORT_VERSION: &str = "0.0.2";

/// A value a record exposes for sorting under some sort key.
#[derive(Clone, Debug, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
}

impl SortValue {
    /// Total order over sort values. Mixed variants cannot arise for a given
    /// key, but the order stays total so the comparator never panics.
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Less,
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Greater,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Field-accessor configuration a record type provides to the controller.
pub trait Record: Clone {
    /// Discriminator used in exports: "users" or "groups".
    const KIND: &'static str;

    /// Per-kind sort column selector.
    type SortKey: Copy + Eq;

    /// Export row shape; optional fields serialize as explicit `null`.
    type Export: Serialize;

    /// Identifier as returned by the backend. Immutable, never generated here.
    fn raw_id(&self) -> &str;

    /// Lowercased field values the search term is matched against.
    fn search_haystacks(&self) -> Vec<String>;

    fn sort_value(&self, key: Self::SortKey) -> SortValue;

    fn to_export(&self) -> Self::Export;
}

/// One page of the filtered view plus pagination metadata.
#[derive(Debug)]
pub struct PageView<'a, R> {
    pub items: &'a [R],
    /// 1-based page index.
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    /// 1-based inclusive display bounds; `0`/`0` when the view is empty.
    pub range_start: usize,
    pub range_end: usize,
}

/// Versioned export document written when the operator downloads a snapshot.
#[derive(Serialize, Debug)]
pub struct ExportDocument<T: Serialize> {
    pub version: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: Vec<T>,
}

pub struct ListView<R: Record> {
    all: Vec<R>,
    filtered: Vec<R>,
    search_term: String,
    sort: Option<(R::SortKey, SortDirection)>,
    page: usize,
    page_size: usize,
}

impl<R: Record> ListView<R> {
    pub fn new(page_size: usize) -> Self {
        Self {
            all: Vec::new(),
            filtered: Vec::new(),
            search_term: String::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Replace the authoritative snapshot wholesale.
    ///
    /// The filtered view becomes a copy of the new snapshot and the page
    /// resets; the current search term and sort are NOT reapplied, so a fresh
    /// load shows unfiltered, unsorted data until the caller re-invokes them.
    pub fn load(&mut self, records: Vec<R>) {
        self.all = records;
        self.filtered = self.all.clone();
        self.page = 1;
    }

    /// Case-insensitive substring filter over the record's configured fields.
    /// A record matches when ANY field contains the term; an empty term
    /// matches everything. Always recomputed from the authoritative snapshot.
    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
        let t = term.to_lowercase();
        self.filtered = self
            .all
            .iter()
            .filter(|r| t.is_empty() || r.search_haystacks().iter().any(|h| h.contains(&t)))
            .cloned()
            .collect();
        self.page = 1;
    }

    /// Sort the filtered view by `key`. Selecting the active key toggles the
    /// direction; a new key starts ascending. Ties fall back to the raw id so
    /// the order is deterministic. The page is left untouched.
    pub fn set_sort(&mut self, key: R::SortKey) {
        let dir = match self.sort {
            Some((current, dir)) if current == key => dir.toggled(),
            _ => SortDirection::Asc,
        };
        self.sort = Some((key, dir));
        self.filtered.sort_by(|a, b| {
            let ord = a
                .sort_value(key)
                .compare(&b.sort_value(key))
                .then_with(|| a.raw_id().cmp(b.raw_id()));
            match dir {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    /// Jump to a 1-based page. No clamping: pagination controls only invoke
    /// next/prev while valid.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn sort(&self) -> Option<(R::SortKey, SortDirection)> {
        self.sort
    }

    pub fn all(&self) -> &[R] {
        &self.all
    }

    pub fn filtered(&self) -> &[R] {
        &self.filtered
    }

    pub fn has_prev_page(&self) -> bool {
        self.page > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.current_page().total_pages
    }

    pub fn current_page(&self) -> PageView<'_, R> {
        let n = self.filtered.len();
        let total_pages = (n.div_ceil(self.page_size)).max(1);
        let start = ((self.page - 1) * self.page_size).min(n);
        let end = (self.page * self.page_size).min(n);
        PageView {
            items: &self.filtered[start..end],
            page: self.page,
            total_pages,
            total_count: n,
            range_start: if n == 0 { 0 } else { start + 1 },
            range_end: end,
        }
    }

    /// Export the CURRENT filtered view (not the full snapshot).
    pub fn export_snapshot(&self) -> ExportDocument<R::Export> {
        ExportDocument {
            version: EXPORT_VERSION,
            kind: R::KIND,
            data: self.filtered.iter().map(R::to_export).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Rec {
        id: String,
        name: String,
        score: Option<f64>,
    }

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    enum RecKey {
        Id,
        Name,
        Score,
    }

    #[derive(Serialize)]
    struct RecExport {
        id: String,
        name: String,
        score: Option<f64>,
    }

    impl Record for Rec {
        const KIND: &'static str = "recs";
        type SortKey = RecKey;
        type Export = RecExport;

        fn raw_id(&self) -> &str {
            &self.id
        }

        fn search_haystacks(&self) -> Vec<String> {
            vec![self.id.to_lowercase(), self.name.to_lowercase()]
        }

        fn sort_value(&self, key: RecKey) -> SortValue {
            match key {
                RecKey::Id => SortValue::Text(self.id.clone()),
                RecKey::Name => SortValue::Text(self.name.clone()),
                RecKey::Score => SortValue::Number(self.score.unwrap_or(f64::NEG_INFINITY)),
            }
        }

        fn to_export(&self) -> RecExport {
            RecExport {
                id: self.id.clone(),
                name: self.name.clone(),
                score: self.score,
            }
        }
    }

    fn rec(id: &str, name: &str, score: Option<f64>) -> Rec {
        Rec {
            id: id.to_string(),
            name: name.to_string(),
            score,
        }
    }

    fn sample(n: usize) -> Vec<Rec> {
        (1..=n)
            .map(|i| rec(&format!("{:03}", i), &format!("rec {}", i), Some(i as f64)))
            .collect()
    }

    #[test]
    fn empty_load_yields_empty_page_with_zero_bounds() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(vec![]);
        let page = view.current_page();
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.range_start, 0);
        assert_eq!(page.range_end, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn pages_partition_the_filtered_view() {
        for (n, ps) in [(25usize, 10usize), (10, 10), (9, 4), (1, 100)] {
            let mut view: ListView<Rec> = ListView::new(ps);
            view.load(sample(n));
            let total_pages = view.current_page().total_pages;
            assert_eq!(total_pages, n.div_ceil(ps).max(1));
            let mut seen = 0;
            for p in 1..=total_pages {
                view.set_page(p);
                seen += view.current_page().items.len();
            }
            assert_eq!(seen, n);
        }
    }

    #[test]
    fn empty_search_term_restores_full_snapshot() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(sample(5));
        view.set_search_term("rec 3");
        assert_eq!(view.filtered().len(), 1);
        view.set_search_term("");
        assert_eq!(view.filtered(), view.all());
    }

    #[test]
    fn search_is_idempotent() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(sample(20));
        view.set_search_term("rec 1");
        let once: Vec<Rec> = view.filtered().to_vec();
        view.set_search_term("rec 1");
        assert_eq!(view.filtered(), &once[..]);
    }

    #[test]
    fn search_matches_any_configured_field_case_insensitively() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(vec![rec("A1", "Alpha", None), rec("B2", "beta", None)]);
        view.set_search_term("ALP");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].id, "A1");
        // Matching on the id field works too.
        view.set_search_term("b2");
        assert_eq!(view.filtered().len(), 1);
        assert_eq!(view.filtered()[0].name, "beta");
    }

    #[test]
    fn search_resets_page_sort_does_not() {
        let mut view: ListView<Rec> = ListView::new(5);
        view.load(sample(20));
        view.set_page(3);
        view.set_sort(RecKey::Id);
        assert_eq!(view.page(), 3);
        view.set_search_term("rec");
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn absent_score_sorts_below_negative_numbers() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(vec![
            rec("a", "a", Some(3.0)),
            rec("b", "b", None),
            rec("c", "c", Some(-5.0)),
        ]);
        view.set_sort(RecKey::Score);
        let ids: Vec<&str> = view.filtered().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn toggling_sort_flips_direction() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(vec![rec("2", "b", None), rec("1", "a", None), rec("3", "c", None)]);
        view.set_sort(RecKey::Name);
        let asc: Vec<String> = view.filtered().iter().map(|r| r.name.clone()).collect();
        assert_eq!(asc, ["a", "b", "c"]);
        view.set_sort(RecKey::Name);
        let desc: Vec<String> = view.filtered().iter().map(|r| r.name.clone()).collect();
        assert_eq!(desc, ["c", "b", "a"]);
        // A different key starts ascending again.
        view.set_sort(RecKey::Id);
        assert_eq!(view.sort(), Some((RecKey::Id, SortDirection::Asc)));
    }

    #[test]
    fn equal_sort_values_tie_break_on_raw_id() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(vec![
            rec("z", "same", None),
            rec("a", "same", None),
            rec("m", "same", None),
        ]);
        view.set_sort(RecKey::Name);
        let ids: Vec<&str> = view.filtered().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "m", "z"]);
    }

    #[test]
    fn pagination_ranges_over_25_records() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(sample(25));
        let page = view.current_page();
        assert_eq!(page.range_start, 1);
        assert_eq!(page.range_end, 10);
        assert_eq!(page.total_pages, 3);
        assert!(view.has_next_page());
        assert!(!view.has_prev_page());
        view.set_page(3);
        let page = view.current_page();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.range_start, 21);
        assert_eq!(page.range_end, 25);
        assert!(!view.has_next_page());
    }

    #[test]
    fn page_size_change_resets_to_first_page() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(sample(30));
        view.set_page(3);
        view.set_page_size(25);
        assert_eq!(view.page(), 1);
        assert_eq!(view.current_page().total_pages, 2);
    }

    #[test]
    fn export_covers_exactly_the_filtered_view() {
        let mut view: ListView<Rec> = ListView::new(10);
        view.load(sample(12));
        view.set_search_term("rec 1");
        let doc = view.export_snapshot();
        assert_eq!(doc.version, EXPORT_VERSION);
        assert_eq!(doc.kind, "recs");
        // "rec 1", "rec 10", "rec 11", "rec 12"
        assert_eq!(doc.data.len(), 4);
    }
}
