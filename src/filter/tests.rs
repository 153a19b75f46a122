// Filter engine tests.

use proptest::prelude::*;

use super::*;

fn record(url: &str, observed_at: &str, status: u16) -> UrlRecord {
    UrlRecord::new(url, observed_at, status)
}

fn sample() -> Vec<UrlRecord> {
    vec![
        record("http://example.com/a.php", "2021-03-04T10:00:00Z", 200),
        record("http://example.com/b.php?id=7", "2022-07-15T00:00:00Z", 404),
        record("http://example.com/c.html", "2023-01-01T12:00:00Z", 200),
        record("https://example.com/Admin/Login.PHP#top", "2023-06-01T00:00:00Z", 301),
        record("http://example.com/", "2020-01-01T00:00:00Z", 200),
        record("http://example.com/docs/report.pdf", "2019-12-31T23:59:59Z", 200),
    ]
}

fn urls(records: &[UrlRecord]) -> Vec<&str> {
    records.iter().map(|r| r.url.as_str()).collect()
}

#[test]
fn test_empty_criteria_is_identity() {
    let records = sample();
    let criteria = FilterCriteria::new();
    assert!(criteria.is_empty());
    assert_eq!(apply(&records, &criteria), records);
}

#[test]
fn test_blank_fields_impose_nothing() {
    let criteria = FilterCriteria::new()
        .with_pattern("   ")
        .with_free_text("")
        .with_date_range(Some("2023".into()), Some("not-a-date".into()));
    assert!(criteria.is_empty());
    assert_eq!(apply(&sample(), &criteria).len(), sample().len());
}

#[test]
fn test_extension_and_status_example() {
    let records = vec![
        record("/a.php", "2023-01-01T00:00:00Z", 200),
        record("/b.php", "2023-01-01T00:00:00Z", 404),
        record("/c.html", "2023-01-01T00:00:00Z", 200),
    ];
    let criteria = FilterCriteria::new()
        .with_extensions(["php"])
        .with_status_codes([200]);
    assert_eq!(urls(&apply(&records, &criteria)), vec!["/a.php"]);
}

#[test]
fn test_extension_case_insensitive_and_ignores_query_fragment() {
    let criteria = FilterCriteria::new().with_extensions([".PHP"]);
    assert_eq!(
        urls(&apply(&sample(), &criteria)),
        vec![
            "http://example.com/a.php",
            "http://example.com/b.php?id=7",
            "https://example.com/Admin/Login.PHP#top",
        ]
    );
}

#[test]
fn test_host_is_not_an_extension() {
    assert_eq!(url_extension("http://example.com"), None);
    assert_eq!(url_extension("http://example.com/"), None);
    assert_eq!(url_extension("http://example.com/dir.v2/page"), None);
    assert_eq!(url_extension("http://example.com/a.tar.GZ"), Some("gz".into()));
    assert_eq!(url_extension("/relative/x.JS?v=1"), Some("js".into()));
    assert_eq!(url_extension("http://example.com/file."), None);
}

#[test]
fn test_status_codes() {
    let criteria = FilterCriteria::new().with_status_codes([301, 404]);
    assert_eq!(
        urls(&apply(&sample(), &criteria)),
        vec![
            "http://example.com/b.php?id=7",
            "https://example.com/Admin/Login.PHP#top",
        ]
    );
}

#[test]
fn test_regex_pattern() {
    let criteria = FilterCriteria::new().with_pattern(r"admin/.*\.php");
    assert_eq!(
        urls(&apply(&sample(), &criteria)),
        vec!["https://example.com/Admin/Login.PHP#top"]
    );
}

#[test]
fn test_invalid_regex_degrades_to_substring() {
    let mut records = sample();
    records.push(record("http://example.com/search?q=(test", "2023-01-01T00:00:00Z", 200));
    let criteria = FilterCriteria::new().with_pattern("q=(TEST");
    assert_eq!(
        urls(&apply(&records, &criteria)),
        vec!["http://example.com/search?q=(test"]
    );
}

#[test]
fn test_date_range_inclusive() {
    let criteria = FilterCriteria::new()
        .with_date_range(Some("20220715".into()), Some("20230101".into()));
    assert_eq!(
        urls(&apply(&sample(), &criteria)),
        vec!["http://example.com/b.php?id=7", "http://example.com/c.html"]
    );
}

#[test]
fn test_date_from_only_and_to_only() {
    let from = FilterCriteria::new().with_date_range(Some("20230101".into()), None);
    assert_eq!(apply(&sample(), &from).len(), 2);

    let to = FilterCriteria::new().with_date_range(None, Some("20191231".into()));
    assert_eq!(
        urls(&apply(&sample(), &to)),
        vec!["http://example.com/docs/report.pdf"]
    );
}

#[test]
fn test_malformed_date_bound_ignored() {
    let criteria = FilterCriteria::new()
        .with_date_range(Some("2023-01-01".into()), Some("2023010".into()));
    assert_eq!(apply(&sample(), &criteria).len(), sample().len());
}

#[test]
fn test_free_text_case_insensitive() {
    let criteria = FilterCriteria::new().with_free_text("LOGIN");
    assert_eq!(
        urls(&apply(&sample(), &criteria)),
        vec!["https://example.com/Admin/Login.PHP#top"]
    );
}

#[test]
fn test_all_criteria_combined() {
    let criteria = FilterCriteria::new()
        .with_extensions(["php", "html"])
        .with_status_codes([200])
        .with_pattern("example")
        .with_date_range(Some("20210101".into()), Some("20231231".into()))
        .with_free_text(".html");
    assert_eq!(
        urls(&apply(&sample(), &criteria)),
        vec!["http://example.com/c.html"]
    );
}

#[test]
fn test_apply_does_not_mutate_input() {
    let records = sample();
    let before = records.clone();
    let _ = apply(&records, &FilterCriteria::new().with_status_codes([404]));
    assert_eq!(records, before);
}

#[test]
fn test_facets() {
    let facets = facets(&sample());
    assert_eq!(
        facets.extensions.into_iter().collect::<Vec<_>>(),
        vec!["html", "pdf", "php"]
    );
    assert_eq!(
        facets.status_codes.into_iter().collect::<Vec<_>>(),
        vec![200, 301, 404]
    );
}

fn arb_record() -> impl Strategy<Value = UrlRecord> {
    (
        "[a-z]{1,6}",
        prop::sample::select(vec!["php", "html", "js", "PDF", ""]),
        prop::sample::select(vec![200u16, 301, 302, 404, 500]),
        2015u32..2025,
        1u32..13,
    )
        .prop_map(|(name, ext, status, year, month)| {
            let url = if ext.is_empty() {
                format!("http://example.com/{name}/")
            } else {
                format!("http://example.com/{name}.{ext}")
            };
            record(&url, &format!("{year}-{month:02}-15T00:00:00Z"), status)
        })
}

proptest! {
    #[test]
    fn prop_empty_criteria_identity(records in prop::collection::vec(arb_record(), 0..40)) {
        prop_assert_eq!(apply(&records, &FilterCriteria::new()), records);
    }

    #[test]
    fn prop_filters_compose_conjunctively(
        records in prop::collection::vec(arb_record(), 0..40),
        exts in prop::collection::btree_set(prop::sample::select(vec!["php", "html", "pdf"]), 0..3),
        codes in prop::collection::btree_set(prop::sample::select(vec![200u16, 404, 500]), 0..3),
    ) {
        let ext_only = FilterCriteria::new().with_extensions(exts.iter());
        let status_only = FilterCriteria::new().with_status_codes(codes.iter().copied());
        let both = FilterCriteria::new()
            .with_extensions(exts.iter())
            .with_status_codes(codes.iter().copied());

        let combined = apply(&records, &both);
        let chained = apply(&apply(&records, &ext_only), &status_only);
        prop_assert_eq!(combined, chained);
    }

    #[test]
    fn prop_result_is_ordered_subsequence(
        records in prop::collection::vec(arb_record(), 0..40),
        code in prop::sample::select(vec![200u16, 301, 404]),
    ) {
        let kept = apply(&records, &FilterCriteria::new().with_status_codes([code]));
        let mut source = records.iter();
        for item in &kept {
            prop_assert!(source.any(|r| r == item));
        }
    }

    #[test]
    fn prop_any_pattern_never_panics(pattern in ".{0,12}", records in prop::collection::vec(arb_record(), 0..10)) {
        let _ = apply(&records, &FilterCriteria::new().with_pattern(pattern));
    }
}
