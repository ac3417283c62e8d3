//! Integration tests for the loader crate.

use hledger_core::{Entry, Journal};
use hledger_loader::{
    Context, DocumentCache, LoadError, MemoryFileSystem, OsFileSystem, ParserCache,
    RevisionCounter,
};
use std::path::Path;
use std::sync::Arc;

fn memory_caches(files: &[(&str, &str)]) -> (MemoryFileSystem, ParserCache) {
    let fs = MemoryFileSystem::new();
    for (path, contents) in files {
        fs.insert(*path, *contents);
    }
    let documents = Arc::new(DocumentCache::new(fs.clone()));
    (fs, ParserCache::new(documents))
}

fn load(cache: &ParserCache, root: &str) -> Result<Journal, LoadError> {
    let ctx = Context::background();
    let journal = cache.parse(&ctx, Path::new(root))?;
    cache.resolve_includes(&ctx, &journal, Path::new(root))
}

fn account_strings(journal: &Journal) -> Vec<String> {
    journal.account_names().map(ToString::to_string).collect()
}

#[test]
fn test_include_resolution_keeps_included_positions() {
    let (_, cache) = memory_caches(&[
        ("some/path/root.journal", "include to/an/include.journal\n"),
        ("some/path/to/an/include.journal", "account assets:Checking\n"),
    ]);

    let journal = load(&cache, "some/path/root.journal").unwrap();
    assert_eq!(journal.entries.len(), 1);

    let Entry::Account(directive) = &journal.entries[0] else {
        panic!("expected account directive, got {:?}", journal.entries[0]);
    };
    let name = &directive.account_name;
    assert_eq!(&*name.pos.filename, "some/path/to/an/include.journal");
    assert_eq!(name.pos.offset, 8);
    assert_eq!(name.end_pos.offset, 23);
}

#[test]
fn test_includes_expand_in_place() {
    let (_, cache) = memory_caches(&[
        (
            "main.journal",
            "account a\ninclude b.journal\n    c  1\ninclude /abs/d.journal\n",
        ),
        ("b.journal", "account b\n"),
        ("abs/d.journal", "account d\n"),
    ]);

    let journal = load(&cache, "main.journal").unwrap();
    assert_eq!(account_strings(&journal), ["a", "b", "c", "d"]);
    assert!(journal.include_paths().next().is_none());
}

#[test]
fn test_nested_includes_resolve_against_root() {
    let (_, cache) = memory_caches(&[
        ("books/main.journal", "include sub/one.journal\n"),
        ("books/sub/one.journal", "include two.journal\n"),
        ("books/two.journal", "account from:Root:Dir\n"),
        ("books/sub/two.journal", "account from:Sub:Dir\n"),
    ]);

    let journal = load(&cache, "books/main.journal").unwrap();
    assert_eq!(account_strings(&journal), ["from:Root:Dir"]);
}

#[test]
fn test_parser_cache_serves_old_result_until_removed() {
    let (_, cache) = memory_caches(&[]);
    let ctx = Context::background();
    let path = Path::new("doc.journal");
    cache.documents().set(path, "account old\n");

    let first = cache.parse(&ctx, path).unwrap();
    assert_eq!(account_strings(&first), ["old"]);

    cache.documents().set(path, "account new\n");
    let second = cache.parse(&ctx, path).unwrap();
    assert_eq!(account_strings(&second), ["old"]);
    assert!(Arc::ptr_eq(&first, &second));

    assert!(cache.remove(path));
    let third = cache.parse(&ctx, path).unwrap();
    assert_eq!(account_strings(&third), ["new"]);
}

#[test]
fn test_missing_include_is_io_error() {
    let (_, cache) = memory_caches(&[("main.journal", "include gone.journal\n")]);
    let err = load(&cache, "main.journal").unwrap_err();
    let LoadError::Io { path, .. } = &err else {
        panic!("expected io error, got {err}");
    };
    assert_eq!(path, Path::new("gone.journal"));
    assert!(err.to_string().contains("gone.journal"));
}

#[test]
fn test_parse_error_in_include_propagates() {
    let (_, cache) = memory_caches(&[
        ("main.journal", "include broken.journal\n"),
        ("broken.journal", "account ok\n    !oops\n"),
    ]);
    let err = load(&cache, "main.journal").unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
    assert!(err.to_string().starts_with("broken.journal:2:"), "{err}");
}

#[test]
fn test_include_cycle_is_detected() {
    let (_, cache) = memory_caches(&[
        ("main.journal", "include a.journal\n"),
        ("a.journal", "include b.journal\n"),
        ("b.journal", "include a.journal\n"),
    ]);
    let err = load(&cache, "main.journal").unwrap_err();
    let LoadError::IncludeCycle { cycle } = &err else {
        panic!("expected include cycle, got {err}");
    };
    assert_eq!(cycle, &["main.journal", "a.journal", "b.journal", "a.journal"]);
}

#[test]
fn test_self_include_is_a_cycle() {
    let (_, cache) = memory_caches(&[("main.journal", "include ./main.journal\n")]);
    let err = load(&cache, "main.journal").unwrap_err();
    assert!(matches!(err, LoadError::IncludeCycle { .. }));
}

#[test]
fn test_include_depth_limit() {
    let (_, cache) = memory_caches(&[
        ("main.journal", "include 1.journal\n"),
        ("1.journal", "include 2.journal\n"),
        ("2.journal", "include 3.journal\n"),
        ("3.journal", "account deep\n"),
    ]);
    let cache = cache.with_max_include_depth(2);
    let err = load(&cache, "main.journal").unwrap_err();
    assert!(matches!(err, LoadError::IncludeDepthExceeded { limit: 2, .. }));

    let (_, cache) = memory_caches(&[
        ("main.journal", "include 1.journal\n"),
        ("1.journal", "include 2.journal\n"),
        ("2.journal", "account ok\n"),
    ]);
    let cache = cache.with_max_include_depth(2);
    assert_eq!(account_strings(&load(&cache, "main.journal").unwrap()), ["ok"]);
}

#[test]
fn test_cancelled_context_stops_resolution() {
    let (_, cache) = memory_caches(&[
        ("main.journal", "include a.journal\n"),
        ("a.journal", "account a\n"),
    ]);
    let counter = RevisionCounter::new();
    let ctx = counter.context();
    let journal = cache.parse(&ctx, Path::new("main.journal")).unwrap();

    counter.bump();
    let err = cache
        .resolve_includes(&ctx, &journal, Path::new("main.journal"))
        .unwrap_err();
    assert!(matches!(err, LoadError::Cancelled));
    assert!(matches!(
        cache.parse(&ctx, Path::new("a.journal")),
        Err(LoadError::Cancelled)
    ));
}

#[test]
fn test_os_filesystem_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("ledger/years")).unwrap();
    std::fs::write(
        dir.path().join("ledger/main.journal"),
        "include years/2024.journal\naccount assets:Cash\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("ledger/years/2024.journal"),
        "2024-01-01 Rent\n    expenses:Rent      900 EUR\n    assets:Bank\n",
    )
    .unwrap();

    let documents = Arc::new(DocumentCache::new(OsFileSystem::new(dir.path())));
    let cache = ParserCache::new(documents);
    let journal = load(&cache, "ledger/main.journal").unwrap();
    assert_eq!(
        account_strings(&journal),
        ["expenses:Rent", "assets:Bank", "assets:Cash"]
    );
}
