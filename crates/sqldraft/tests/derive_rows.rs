//! `#[derive(FromRow, Fields)]` against hand-built rows.

mod common;

use common::MockClient;
use sqldraft::{Embed, EmbedTarget, Fields, FromRow, Row, Table, Value, predicates};

#[derive(Debug, PartialEq, FromRow, Fields)]
struct City {
    id: i64,
    #[draft(column = "city_name")]
    name: String,
    zip: Option<String>,
}

#[derive(Debug, FromRow)]
struct User {
    id: i64,
    username: String,
}

#[test]
fn fields_follow_column_renames() {
    assert_eq!(City::FIELDS, ["id", "city_name", "zip"]);
}

#[test]
fn from_row_reads_renamed_and_nullable_columns() {
    let row = Row::new()
        .with("id", 3)
        .with("city_name", "Lyon")
        .with("zip", Value::Null);
    let city = City::from_row(&row).unwrap();
    assert_eq!(
        city,
        City {
            id: 3,
            name: "Lyon".into(),
            zip: None
        }
    );
}

#[test]
fn from_row_reports_missing_column() {
    let err = City::from_row(&Row::new().with("id", 3)).unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn fetch_all_as_maps_rows() {
    let client = MockClient::new().with_rows(vec![
        Row::new().with("id", 1).with("username", "ann"),
        Row::new().with("id", 2).with("username", "bob"),
    ]);
    let mut users = Table::new("user").with_alias("u");
    let users: Vec<User> = users
        .select(["id", "username"])
        .fetch_all_as(&client)
        .await
        .unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].username, "bob");
    assert_eq!(users[0].id, 1);
}

#[tokio::test]
async fn fetch_one_as_maps_first_row() {
    let client = MockClient::new().with_rows(vec![Row::new().with("id", 7).with("username", "cy")]);
    let mut users = Table::new("user");
    let user: Option<User> = users
        .and_where(predicates! { "id" => 7 })
        .fetch_one_as(&client)
        .await
        .unwrap();
    assert_eq!(user.map(|u| u.username), Some("cy".to_string()));
}

#[tokio::test]
async fn add_model_projects_derived_fields() {
    let client = MockClient::new().with_rows(vec![
        Row::new()
            .with("id", 1)
            .with("c_id", 4)
            .with("c_city_name", "Lyon")
            .with("c_zip", "69000"),
    ]);
    let mut embed = Embed::new(Table::new("user").with_alias("u"));
    let cities = embed.add_model::<City>(EmbedTarget::direct("city c")).unwrap();

    let mut user = embed.finish(&client).await.unwrap().unwrap();
    assert_eq!(
        user.take(&cities).unwrap(),
        vec![City {
            id: 4,
            name: "Lyon".into(),
            zip: Some("69000".into())
        }]
    );
    assert!(client.last_sql().starts_with(
        "SELECT u.*, c.`id` AS c_id, c.`city_name` AS c_city_name, c.`zip` AS c_zip FROM"
    ));
}
