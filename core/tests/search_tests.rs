use docsearch_core::{
    Diagnostic, IndexBuilder, InvertedIndex, Posting, RecordingSink, RelevanceResult, SearchEngine, SearchServer,
};
use std::sync::Arc;

fn r(doc_id: u32, rank: f32) -> RelevanceResult {
    RelevanceResult { doc_id, rank }
}

fn corpus() -> Vec<String> {
    vec![
        "milk milk milk milk water water water".to_string(),
        "milk water water".to_string(),
        "milk milk milk milk milk water water water water water".to_string(),
        "americano cappuccino".to_string(),
    ]
}

#[test]
fn builds_are_deterministic() {
    let docs: Vec<String> = (0..500)
        .map(|i| format!("doc{} shared {} words here {}", "z".repeat(i % 11), "q ".repeat(i % 5), i % 13))
        .collect();
    let reference = IndexBuilder::new().with_threads(1).build(&docs);
    for round in 0..5 {
        for threads in [2, 4, 8] {
            let idx = IndexBuilder::new().with_threads(threads).build(&docs);
            assert_eq!(idx, reference, "round {round}, {threads} threads");
        }
        assert_eq!(InvertedIndex::build(&docs), reference);
    }
}

#[test]
fn posting_lists_are_strictly_ascending() {
    let docs: Vec<String> = (0..300).map(|i| format!("common rare{} common {}", i % 17, "x ".repeat(i % 4))).collect();
    let idx = IndexBuilder::new().with_threads(4).build(&docs);
    for word in idx.words() {
        let list = idx.get_word_count(word);
        assert!(!list.is_empty());
        assert!(list.windows(2).all(|w| w[0].doc_id < w[1].doc_id), "{word}");
    }
    assert_eq!(idx.get_word_count("common").len(), 300);
    assert!(idx.get_word_count("common").iter().all(|p| p.count == 2));
}

#[test]
fn get_word_count_matches_reference_counts() {
    let idx = InvertedIndex::build(&corpus());
    assert_eq!(
        idx.get_word_count("water"),
        &[
            Posting { doc_id: 0, count: 3 },
            Posting { doc_id: 1, count: 2 },
            Posting { doc_id: 2, count: 5 },
        ]
    );
    assert_eq!(idx.get_word_count("cappuccino"), &[Posting { doc_id: 3, count: 1 }]);
}

#[test]
fn conjunctive_matching() {
    let idx = InvertedIndex::build(&["a b c", "a b", "a c"]);
    let got = SearchServer::new(&idx).search_query("a b");
    let ids: Vec<u32> = got.iter().map(|r| r.doc_id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn one_unknown_word_voids_the_query() {
    let idx = InvertedIndex::build(&corpus());
    assert!(SearchServer::new(&idx).search_query("milk sugar").is_empty());
}

#[test]
fn disjoint_words_give_no_results() {
    let idx = InvertedIndex::build(&corpus());
    assert!(SearchServer::new(&idx).search_query("milk americano").is_empty());
}

#[test]
fn ranks_are_relative_with_doc_id_tie_break() {
    // absolute scores {0: 4, 1: 2, 2: 4}
    let idx = InvertedIndex::build(&["x x y y", "x y", "y y y x"]);
    let got = SearchServer::new(&idx).search_query("x y");
    assert_eq!(got, vec![r(0, 1.0), r(2, 1.0), r(1, 0.5)]);
}

#[test]
fn scores_sum_counts_of_all_query_words() {
    let idx = InvertedIndex::build(&corpus());
    let got = SearchServer::new(&idx).search_query("water milk");
    assert_eq!(got, vec![r(2, 1.0), r(0, 0.7), r(1, 0.3)]);
}

#[test]
fn limit_keeps_the_best_results() {
    let idx = InvertedIndex::build(&corpus());
    let got = SearchServer::new(&idx).with_responses_limit(2).search_query("milk water");
    assert_eq!(got, vec![r(2, 1.0), r(0, 0.7)]);
}

#[test]
fn empty_inputs() {
    let empty: Vec<String> = Vec::new();
    let idx = InvertedIndex::build(&empty);
    let server = SearchServer::new(&idx);
    assert_eq!(server.search(&["milk", ""]), vec![vec![], vec![]]);
    assert!(server.search(&empty).is_empty());

    let idx = InvertedIndex::build(&corpus());
    let server = SearchServer::new(&idx);
    assert!(server.search_query("").is_empty());
    assert!(server.search_query("?! 123").is_empty());
}

#[test]
fn query_case_does_not_matter() {
    let idx = InvertedIndex::build(&["Moscow is the capital of Russia", "london"]);
    let server = SearchServer::new(&idx);
    assert_eq!(server.search_query("MOSCOW, Russia!"), server.search_query("moscow russia"));
    assert_eq!(server.search_query("London"), vec![r(1, 1.0)]);
}

#[test]
fn overlong_words_are_never_indexed() {
    let long = "k".repeat(101);
    let idx = InvertedIndex::build(&[format!("short {long}")]);
    assert!(idx.get_word_count(&long).is_empty());
    assert_eq!(idx.num_words(), 1);
}

#[test]
fn only_first_thousand_document_words_count() {
    let mut words = vec!["w"; 1000];
    words.push("tail");
    let idx = InvertedIndex::build(&[words.join(" ")]);
    assert_eq!(idx.get_word_count("w"), &[Posting { doc_id: 0, count: 1000 }]);
    assert!(idx.get_word_count("tail").is_empty());
}

#[test]
fn batch_keeps_input_order() {
    let engine = SearchEngine::new(&corpus()).with_responses_limit(5);
    let got = engine.search(&["cappuccino", "sugar", "milk"]);
    assert_eq!(got.len(), 3);
    assert_eq!(got[0], vec![r(3, 1.0)]);
    assert!(got[1].is_empty());
    assert_eq!(got[2].iter().map(|x| x.doc_id).collect::<Vec<_>>(), vec![2, 0, 1]);
}

#[test]
fn oversized_batch_is_cut_and_reported() {
    let idx = InvertedIndex::build(&corpus());
    let sink = Arc::new(RecordingSink::new());
    let queries = vec!["milk"; 1003];
    let got = SearchServer::new(&idx).with_sink(sink.clone()).search(&queries);
    assert_eq!(got.len(), 1000);
    assert_eq!(sink.events(), vec![Diagnostic::RequestsTruncated { requests: 1003, kept: 1000 }]);
}

#[test]
fn oversized_query_is_cut_and_reported() {
    let idx = InvertedIndex::build(&["a b c d e f g h i j", "a b c d e f g h i j k"]);
    let sink = Arc::new(RecordingSink::new());
    let got = SearchServer::new(&idx).with_sink(sink.clone()).search(&["x", "a b c d e f g h i j k"]);
    // "k" is past the cap, so doc 0 still matches
    assert_eq!(got[1], vec![r(0, 1.0), r(1, 1.0)]);
    assert_eq!(sink.events(), vec![Diagnostic::QueryTruncated { query: 1, words: 11, kept: 10 }]);
}

#[test]
fn engine_reports_build_diagnostics_to_its_sink() {
    let sink = Arc::new(RecordingSink::new());
    let mut engine = SearchEngine::default().with_sink(sink.clone()).with_threads(2);
    let long = "w ".repeat(1200);
    engine.update_document_base(&["ok", long.as_str()]);
    assert_eq!(sink.events(), vec![Diagnostic::DocumentTruncated { doc_id: 1, words: 1200, kept: 1000 }]);
}
