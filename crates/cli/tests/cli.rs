//! End-to-end tests for the fkm binary

use assert_cmd::cargo;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const BLOG: &str = r#"
name = "create_blog"

[[tables]]
name = "posts"
columns = [
    { name = "author_id" },
    { name = "category_id", on_delete = "cascade" },
    { name = "title" },
]

[[tables]]
name = "categories"
columns = [{ name = "parent_id" }]
"#;

/// Get the fkm binary, isolated from the caller's environment
fn fkm(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("fkm"));
    cmd.current_dir(dir).env_remove("FKM_DIALECT").env_remove("RUST_LOG");
    cmd
}

fn blog_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("blog.toml"), BLOG).unwrap();
    temp
}

mod generate {
    use super::*;

    #[test]
    fn prints_add_constraint_statements() {
        let temp = blog_dir();

        fkm(temp.path())
            .args(["generate", "blog.toml"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "ALTER TABLE posts ADD CONSTRAINT fk_posts_author_id FOREIGN KEY (author_id) REFERENCES authors (id);",
            ))
            .stdout(predicate::str::contains(
                "REFERENCES categories (id) ON DELETE CASCADE;",
            ))
            .stdout(predicate::str::contains(
                "ALTER TABLE categories ADD CONSTRAINT fk_categories_parent_id FOREIGN KEY (parent_id) REFERENCES categories (id);",
            ));
    }

    #[test]
    fn dialect_flag_and_env() {
        let temp = blog_dir();

        fkm(temp.path())
            .args(["generate", "blog.toml", "--dialect", "mysql", "--quote"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ALTER TABLE `posts` ADD CONSTRAINT `fk_posts_author_id`"));

        fkm(temp.path())
            .env("FKM_DIALECT", "mssql")
            .args(["generate", "blog.toml", "--quote"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ALTER TABLE [posts]"));
    }

    #[test]
    fn unsupported_dialect_fails() {
        let temp = blog_dir();

        fkm(temp.path())
            .args(["generate", "blog.toml", "--dialect", "sqlite"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported SQL dialect"));
    }

    #[test]
    fn config_file_is_picked_up() {
        let temp = blog_dir();
        std::fs::write(
            temp.path().join("fkm.toml"),
            "[generator]\non_update = \"cascade\"\n",
        )
        .unwrap();

        fkm(temp.path())
            .args(["generate", "blog.toml"])
            .assert()
            .success()
            .stdout(predicate::str::contains("REFERENCES authors (id) ON UPDATE CASCADE;"));
    }

    #[test]
    fn writes_migration_files() {
        let temp = blog_dir();

        fkm(temp.path())
            .args(["generate", "blog.toml", "--output", "out"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Migration Generation Complete"));

        let migrations = temp.path().join("out").join("migrations");
        let dirs: Vec<_> = std::fs::read_dir(&migrations)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(dirs.len(), 1);

        let up = std::fs::read_to_string(dirs[0].join("up.sql")).unwrap();
        let down = std::fs::read_to_string(dirs[0].join("down.sql")).unwrap();
        assert!(up.contains("-- Dialect: PostgreSQL"));
        assert!(down.contains("ALTER TABLE posts DROP CONSTRAINT fk_posts_author_id;"));
    }

    #[test]
    fn no_truncate_reports_long_names() {
        let temp = blog_dir();

        fkm(temp.path())
            .args(["generate", "blog.toml", "--identifier-limit", "16", "--no-truncate"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("exceeding the limit of 16"));

        fkm(temp.path())
            .args(["generate", "blog.toml", "--identifier-limit", "16"])
            .assert()
            .success()
            .stdout(predicate::str::contains("-- warning: Constraint 'fk_posts_author_id'"));
    }
}

mod drop {
    use super::*;

    #[test]
    fn prints_drop_statements_in_reverse() {
        let temp = blog_dir();

        let output = fkm(temp.path())
            .args(["drop", "blog.toml"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = String::from_utf8(output.stdout).unwrap();
        let parent = stdout
            .find("ALTER TABLE categories DROP CONSTRAINT fk_categories_parent_id;")
            .unwrap();
        let author = stdout
            .find("ALTER TABLE posts DROP CONSTRAINT fk_posts_author_id;")
            .unwrap();
        assert!(parent < author);
    }

    #[test]
    fn mysql_drops_foreign_key() {
        let temp = blog_dir();

        fkm(temp.path())
            .args(["drop", "blog.toml", "-d", "mysql"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ALTER TABLE posts DROP FOREIGN KEY fk_posts_author_id;"));
    }
}

mod check {
    use super::*;

    #[test]
    fn reports_valid_documents() {
        let temp = blog_dir();

        fkm(temp.path())
            .args(["check", "."])
            .assert()
            .success()
            .stdout(predicate::str::contains("create_blog (3 foreign keys, PostgreSQL)"));
    }

    #[test]
    fn rejects_invalid_documents() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("broken.toml"),
            "[[tables]]\nname = \"posts\"\n\n[[tables]]\nname = \"posts\"\n",
        )
        .unwrap();

        fkm(temp.path())
            .args(["check", "broken.toml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid schema document"));
    }

    #[test]
    fn missing_file_fails() {
        let temp = TempDir::new().unwrap();

        fkm(temp.path())
            .args(["check", "missing.toml"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }
}
