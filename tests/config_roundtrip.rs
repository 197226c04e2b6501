mod helpers;

use gitwrap::{ConfigScope, Repository};
use helpers::{create_test_repo, git};
use std::fs;

#[test]
fn test_set_then_get_same_scope() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    let values = [
        ("gitwrap.plain", "value"),
        ("gitwrap.equals", "a=b=c"),
        ("gitwrap.spaces", "  padded value  "),
        ("gitwrap.unicode", "héllo wörld"),
        ("gitwrap.shell", "$(echo nope); `id`"),
    ];

    for (key, value) in values {
        repo.set_config(ConfigScope::Local, key, value).unwrap();
        assert_eq!(
            repo.get_config(ConfigScope::Local, key).unwrap().as_deref(),
            Some(value),
            "round trip of {}",
            key
        );
        assert_eq!(
            repo.get_config(ConfigScope::Unspecified, key).unwrap().as_deref(),
            Some(value)
        );
    }
}

#[test]
fn test_config_list_contains_entries() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    repo.set_config(ConfigScope::Local, "gitwrap.url", "https://x.test/?a=1&b=2")
        .unwrap();

    let local = repo.configs(ConfigScope::Local).unwrap();
    assert_eq!(local["user.name"], "Test User");
    assert_eq!(local["gitwrap.url"], "https://x.test/?a=1&b=2");

    let merged = repo.configs(ConfigScope::Unspecified).unwrap();
    assert_eq!(merged["gitwrap.url"], "https://x.test/?a=1&b=2");
}

#[test]
fn test_missing_key() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    assert_eq!(repo.get_config(ConfigScope::Local, "gitwrap.missing").unwrap(), None);
    assert_eq!(
        repo.get_config_or(ConfigScope::Local, "gitwrap.missing", "fallback")
            .unwrap(),
        "fallback"
    );
    assert!(!repo.has_config(ConfigScope::Local, "gitwrap.missing").unwrap());
    assert_eq!(repo.config_scope("gitwrap.missing").unwrap(), None);
    assert!(repo
        .get_config_all(ConfigScope::Local, "gitwrap.missing")
        .unwrap()
        .is_empty());
}

#[test]
fn test_multi_valued_key() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    repo.add_config(ConfigScope::Local, "gitwrap.list", "one").unwrap();
    repo.add_config(ConfigScope::Local, "gitwrap.list", "two").unwrap();
    repo.add_config(ConfigScope::Local, "gitwrap.list", "three").unwrap();

    assert_eq!(
        repo.get_config_all(ConfigScope::Local, "gitwrap.list").unwrap(),
        vec!["one", "two", "three"]
    );

    // --list prints every value; the last one wins in the map
    let local = repo.configs(ConfigScope::Local).unwrap();
    assert_eq!(local["gitwrap.list"], "three");

    repo.delete_config(ConfigScope::Local, "gitwrap.list").unwrap();
    assert!(repo
        .get_config_all(ConfigScope::Local, "gitwrap.list")
        .unwrap()
        .is_empty());
}

#[test]
fn test_scope_resolution_and_delete() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    repo.set_config(ConfigScope::Local, "gitwrap.scoped", "yes").unwrap();
    assert!(repo.has_config(ConfigScope::Local, "gitwrap.scoped").unwrap());
    assert_eq!(
        repo.config_scope("gitwrap.scoped").unwrap(),
        Some(ConfigScope::Local)
    );

    repo.delete_config(ConfigScope::Unspecified, "gitwrap.scoped")
        .unwrap();
    assert_eq!(repo.get_config(ConfigScope::Local, "gitwrap.scoped").unwrap(), None);

    // Deleting again is a no-op
    repo.delete_config(ConfigScope::Unspecified, "gitwrap.scoped")
        .unwrap();
    repo.delete_config(ConfigScope::Local, "gitwrap.scoped").unwrap();
}

#[test]
fn test_worktree_scope_reads_back() {
    let (_temp, repo_path) = create_test_repo();
    git(&repo_path, &["config", "core.repositoryformatversion", "1"]);
    git(&repo_path, &["config", "extensions.worktreeConfig", "true"]);
    let repo = Repository::new(&repo_path);

    repo.set_config(ConfigScope::Worktree, "gitwrap.tree", "wt").unwrap();
    assert_eq!(
        repo.get_config(ConfigScope::Worktree, "gitwrap.tree")
            .unwrap()
            .as_deref(),
        Some("wt")
    );
    assert_eq!(
        repo.config_scope("gitwrap.tree").unwrap(),
        Some(ConfigScope::Worktree)
    );
}

#[test]
fn test_corrupt_config_is_an_error() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);
    fs::write(repo_path.join(".git").join("config"), "[core\n garbage ===\n").unwrap();

    let err = repo.get_config(ConfigScope::Local, "user.name").unwrap_err();
    assert_eq!(err.exit_code(), Some(128));

    assert!(repo.get_config_all(ConfigScope::Local, "user.name").is_err());
    assert!(repo.has_config(ConfigScope::Local, "user.name").is_err());
    assert!(repo.config_scope("user.name").is_err());
    assert!(repo.delete_config(ConfigScope::Local, "user.name").is_err());
    assert!(repo.delete_config(ConfigScope::Unspecified, "user.name").is_err());
    assert!(repo.configs(ConfigScope::Local).is_err());
}
