use super::*;
use crate::condition::op;
use crate::config::Dialect;
use crate::predicates;
use crate::row::Row;
use chrono::NaiveDate;

fn users() -> Table {
    Table::new("user")
        .with_alias("u")
        .with_known_aliases(["u", "c", "i"])
}

fn ts() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

// ==================== SELECT ====================

#[test]
fn empty_select_is_wildcard() {
    let mut t = users();
    t.select(Vec::<&str>::new());
    assert_eq!(t.build().sql, "SELECT * FROM `user` u");
}

#[test]
fn select_columns() {
    let mut t = users();
    t.select(["name", "username"]);
    assert_eq!(t.build().sql, "SELECT `name`, `username` FROM `user` u");
}

#[test]
fn select_appends() {
    let mut t = users();
    t.select(["name"]).select(["username", "name"]);
    assert_eq!(t.build().sql, "SELECT `name`, `username` FROM `user` u");
}

#[test]
fn select_with_left_join() {
    let mut t = users();
    t.select(["u.name", "u.username", "c.name"])
        .left_join("city c", "c.id", "u.city_id");
    assert_eq!(
        t.build().sql,
        "SELECT u.`name`, u.`username`, c.`name` FROM `user` u LEFT JOIN `city` c ON c.id = u.city_id"
    );
}

#[test]
fn join_without_alias() {
    let mut t = Table::new("user");
    t.left_join("city", "city.id", "user.city_id");
    assert_eq!(
        t.build().sql,
        "SELECT * FROM `user` LEFT JOIN `city` ON city.id = user.city_id"
    );
}

#[test]
fn join_alias_becomes_known() {
    let mut t = Table::new("user").with_alias("u");
    t.select(["x.name"]).left_join("city x", "x.id", "u.city_id");
    assert!(t.build().sql.starts_with("SELECT x.`name` FROM"));
}

// ==================== WHERE ====================

#[test]
fn where_and() {
    let mut t = users();
    t.and_where(predicates! { "name" => "foo bar", "username" => "foo" });
    let query = t.build();
    assert_eq!(
        query.sql,
        "SELECT * FROM `user` u WHERE name = ? AND username = ?"
    );
    assert_eq!(query.params, vec![Value::from("foo bar"), Value::from("foo")]);
}

#[test]
fn where_or() {
    let mut t = users();
    t.or_where(predicates! { "name" => "foo bar", "username" => "foo" });
    assert_eq!(
        t.build().sql,
        "SELECT * FROM `user` u WHERE (name = ? OR username = ?)"
    );
}

#[test]
fn where_like() {
    let mut t = users();
    t.and_where(predicates! { "name" => "foo bar", "username" => op("LIKE", "\"foo%\"") });
    let query = t.build();
    assert_eq!(
        query.sql,
        "SELECT * FROM `user` u WHERE name = ? AND username LIKE ?"
    );
    assert_eq!(query.params[1], Value::from("\"foo%\""));
}

#[test]
fn groups_join_with_and_in_order() {
    let mut t = users();
    t.and_where(predicates! { "u.active" => true })
        .or_where(predicates! { "u.role" => "admin", "u.id" => vec![1, 2] })
        .where_group(predicates! { "u.age" => op(">", 18) }, Logic::And);
    let query = t.build();
    assert_eq!(
        query.sql,
        "SELECT * FROM `user` u WHERE u.active = ? AND (u.role = ? OR u.id IN (?, ?)) AND u.age > ?"
    );
    assert_eq!(query.sql.matches('?').count(), query.params.len());
    assert_eq!(
        query.params,
        vec![
            Value::Bool(true),
            Value::from("admin"),
            Value::Int(1),
            Value::Int(2),
            Value::Int(18),
        ]
    );
}

// ==================== GROUP / ORDER / LIMIT ====================

#[test]
fn limit_count() {
    let mut t = users();
    t.limit(10);
    assert_eq!(t.build().sql, "SELECT * FROM `user` u LIMIT 10");
}

#[test]
fn limit_offset_count() {
    let mut t = users();
    t.limit_offset(0, 10);
    assert_eq!(t.build().sql, "SELECT * FROM `user` u LIMIT 0, 10");
}

#[test]
fn count_auto_alias() {
    let mut t = users();
    t.count();
    assert_eq!(t.build().sql, "SELECT COUNT(*) AS u_count FROM `user` u");
}

#[test]
fn count_without_alias_uses_table_name() {
    let mut t = Table::new("user");
    t.count();
    assert_eq!(t.build().sql, "SELECT COUNT(*) AS user_count FROM `user`");
}

#[test]
fn select_count_with_join() {
    let mut t = users();
    t.select(["u.username", "COUNT(i.id)"])
        .left_join("item i", "i.owner_id", "u.id");
    assert_eq!(
        t.build().sql,
        "SELECT u.`username`, COUNT(i.`id`) AS i_count FROM `user` u LEFT JOIN `item` i ON i.owner_id = u.id"
    );
}

#[test]
fn clauses_render_in_fixed_order() {
    let mut t = users();
    t.limit(5)
        .order_by(OrderBy::new().desc("u.created_at").asc("u.id"))
        .group_by(["u.id"])
        .and_where(predicates! { "u.active" => true })
        .left_join("item i", "i.owner_id", "u.id")
        .select(["u.id", "COUNT(i.id)"]);
    assert_eq!(
        t.build().sql,
        "SELECT u.`id`, COUNT(i.`id`) AS i_count FROM `user` u \
         LEFT JOIN `item` i ON i.owner_id = u.id \
         WHERE u.active = ? \
         GROUP BY u.`id` \
         ORDER BY u.`created_at` DESC, u.`id` ASC \
         LIMIT 5"
    );
}

#[test]
fn plain_order_by_has_no_direction() {
    let mut t = users();
    t.order_by(OrderBy::columns(["name", "u.id"]));
    assert_eq!(t.build().sql, "SELECT * FROM `user` u ORDER BY `name`, u.`id`");
}

#[test]
fn group_and_order_keep_trailing_words() {
    let mut t = users();
    t.group_by(["name x"])
        .order_by(OrderBy::columns(["name DESC"]));
    assert_eq!(
        t.build().sql,
        "SELECT * FROM `user` u GROUP BY `name x` ORDER BY `name DESC`"
    );
}

// ==================== Build lifecycle ====================

#[test]
fn build_resets_draft() {
    let mut t = users();
    t.select(["name"])
        .and_where(predicates! { "name" => "x" })
        .limit(1);
    let first = t.build();
    assert_eq!(first.sql, "SELECT `name` FROM `user` u WHERE name = ? LIMIT 1");
    assert!(t.draft().is_empty());

    let second = t.build();
    assert_eq!(second.sql, "SELECT * FROM `user` u");
    assert!(second.params.is_empty());
}

#[test]
fn soft_delete_predicate_is_injected() {
    let mut t = users().with_meta(TableMeta::new(false, true));
    t.and_where(predicates! { "name" => "x" });
    let query = t.build();
    assert_eq!(
        query.sql,
        "SELECT * FROM `user` u WHERE name = ? AND u.deleted_at IS NULL"
    );
    assert_eq!(query.params, vec![Value::from("x")]);
}

#[test]
fn soft_delete_respects_existing_predicate() {
    let mut t = users().with_meta(TableMeta::new(false, true));
    t.and_where(Predicates::new().is_not_null("u.deleted_at"));
    assert_eq!(
        t.build().sql,
        "SELECT * FROM `user` u WHERE u.deleted_at IS NOT NULL"
    );
}

#[test]
fn soft_delete_ignores_joined_table_column() {
    let mut t = users().with_meta(TableMeta::new(false, true));
    t.left_join("city c", "c.id", "u.city_id")
        .and_where(Predicates::new().is_null("c.deleted_at"));
    assert_eq!(
        t.build().sql,
        "SELECT * FROM `user` u LEFT JOIN `city` c ON c.id = u.city_id \
         WHERE c.deleted_at IS NULL AND u.deleted_at IS NULL"
    );
}

#[test]
fn soft_delete_respects_table_name_qualifier() {
    let mut t = users().with_meta(TableMeta::new(false, true));
    t.and_where(Predicates::new().is_not_null("`user`.deleted_at"));
    assert_eq!(
        t.build().sql,
        "SELECT * FROM `user` u WHERE `user`.deleted_at IS NOT NULL"
    );
}

#[test]
fn soft_delete_without_alias_quotes_table() {
    let mut t = Table::new("user").with_meta(TableMeta::new(false, true));
    assert_eq!(
        t.build().sql,
        "SELECT * FROM `user` WHERE `user`.deleted_at IS NULL"
    );
}

#[test]
fn soft_delete_column_follows_config() {
    let mut t = users()
        .with_meta(TableMeta::new(false, true))
        .with_config(TableConfig::new().with_soft_delete_column("removed_at"));
    assert_eq!(
        t.build().sql,
        "SELECT * FROM `user` u WHERE u.removed_at IS NULL"
    );
}

// ==================== CRUD statements ====================

#[test]
fn insert_statement_plain() {
    let t = users();
    let query = t
        .insert_statement(Row::new().with("name", "ann").with("age", 30), ts())
        .unwrap();
    assert_eq!(query.sql, "INSERT INTO `user` (`name`, `age`) VALUES (?, ?)");
    assert_eq!(query.params, vec![Value::from("ann"), Value::Int(30)]);
}

#[test]
fn insert_statement_sets_timestamps() {
    let t = users().with_meta(TableMeta::new(true, false));
    let query = t
        .insert_statement(Row::new().with("name", "ann"), ts())
        .unwrap();
    assert_eq!(
        query.sql,
        "INSERT INTO `user` (`name`, `created_at`, `updated_at`) VALUES (?, ?, ?)"
    );
    assert_eq!(query.params[1], Value::Timestamp(ts()));
    assert_eq!(query.params[2], Value::Timestamp(ts()));
}

#[test]
fn insert_statement_rejects_empty_row() {
    let err = users().insert_statement(Row::new(), ts()).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn insert_ignore_follows_dialect() {
    let mysql = users();
    let sqlite = users().with_config(TableConfig::new().with_dialect(Dialect::Sqlite));
    let data = Row::new().with("name", "ann");
    assert_eq!(
        mysql.insert_ignore_statement(data.clone(), ts()).unwrap().sql,
        "INSERT IGNORE INTO `user` (`name`) VALUES (?)"
    );
    assert_eq!(
        sqlite.insert_ignore_statement(data, ts()).unwrap().sql,
        "INSERT OR IGNORE INTO `user` (`name`) VALUES (?)"
    );
}

#[test]
fn update_statement_refreshes_updated_at() {
    let t = users().with_meta(TableMeta::new(true, false));
    let query = t
        .update_statement(
            Row::new().with("name", "bob"),
            predicates! { "id" => 7 },
            ts(),
        )
        .unwrap();
    assert_eq!(
        query.sql,
        "UPDATE `user` SET `name` = ?, `updated_at` = ? WHERE id = ?"
    );
    assert_eq!(
        query.params,
        vec![Value::from("bob"), Value::Timestamp(ts()), Value::Int(7)]
    );
}

#[test]
fn delete_statement_hard() {
    let query = users().delete_statement(predicates! { "id" => vec![1, 2] }, ts());
    assert_eq!(query.sql, "DELETE FROM `user` WHERE id IN (?, ?)");
    assert_eq!(query.params, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn delete_statement_soft() {
    let t = users().with_meta(TableMeta::new(false, true));
    let query = t.delete_statement(predicates! { "id" => 3 }, ts());
    assert_eq!(query.sql, "UPDATE `user` SET `deleted_at` = ? WHERE id = ?");
    assert_eq!(query.params, vec![Value::Timestamp(ts()), Value::Int(3)]);
}

#[test]
fn drop_all_statement_deletes_everything() {
    let t = users().with_meta(TableMeta::new(true, true));
    assert_eq!(t.drop_all_statement().sql, "DELETE FROM `user`");
}
