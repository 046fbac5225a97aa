//! Statement rendering against a model table.

mod common;

use common::{assert_ex, int, text, User};
use oxide_query::builder::{
    col, columns_and_values, comment, count, group_by, limit, on_conflict, order_by, returning,
    where_clause, Delete, Insert, RenderContext, Select, SqlExpr, Update,
};
use oxide_query::dialect::{Dialect, MySql, Postgres};
use oxide_query::schema::Model;

#[test]
fn test_select_model_columns() {
    let table = User::describe().unwrap();
    let stmt = Select::new().from(
        &table,
        [
            where_clause(col("f_gender").eq(1)),
            order_by([col("f_id").asc()]),
            limit(20).offset(40),
        ],
    );
    assert_ex(
        &stmt,
        "SELECT f_id,f_name,f_nickname,f_username,f_gender FROM t_user\n\
         WHERE f_gender = ?\n\
         ORDER BY f_id ASC\n\
         LIMIT 20 OFFSET 40",
        &[int(1)],
    );
}

#[test]
fn test_select_count_grouped() {
    let table = User::describe().unwrap();
    let gender = table.fields(["Gender"]).unwrap();
    let stmt = Select::expr(count()).from(&table, [group_by(gender).having(col("f_gender").gt(0))]);
    assert_ex(
        &stmt,
        "SELECT COUNT(*) FROM t_user\nGROUP BY f_gender HAVING f_gender > ?",
        &[int(0)],
    );
}

#[test]
fn test_insert_from_field_names() {
    let table = User::describe().unwrap();
    let columns = table.fields(["Name", "Gender"]).unwrap();
    let stmt = Insert::new()
        .into_table(&table, [comment("seed")])
        .values(columns, [text("a"), int(1), text("b"), int(2)])
        .unwrap();
    assert_ex(
        &stmt,
        "INSERT INTO t_user (f_name,f_gender) VALUES (?,?),(?,?)\n/* seed */",
        &[text("a"), int(1), text("b"), int(2)],
    );
}

#[test]
fn test_upsert_per_dialect() {
    let table = User::describe().unwrap();
    let stmt = Insert::new()
        .into_table(
            &table,
            [on_conflict(table.fields(["Name"]).unwrap())
                .do_update(col("f_nickname").value_by("nick"))],
        )
        .values(table.fields(["Name", "Nickname"]).unwrap(), ["a", "b"])
        .unwrap();

    let mysql = stmt.ex(&RenderContext::with_dialect(&MySql));
    assert_eq!(
        MySql.finalize(mysql).sql(),
        "INSERT INTO t_user (f_name,f_nickname) VALUES (?,?)\nON DUPLICATE KEY UPDATE f_nickname = ?"
    );

    let postgres = Postgres.finalize(stmt.ex(&RenderContext::with_dialect(&Postgres)));
    assert_eq!(
        postgres.sql(),
        "INSERT INTO t_user (f_name,f_nickname) VALUES ($1,$2)\n\
         ON CONFLICT (f_name) DO UPDATE SET f_nickname = $3"
    );
    assert_eq!(postgres.args(), &[text("a"), text("b"), text("nick")]);
}

#[test]
fn test_insert_returning() {
    let table = User::describe().unwrap();
    let stmt = Insert::new()
        .into_table(&table, [returning(table.fields(["ID"]).unwrap())])
        .values(table.fields(["Name"]).unwrap(), ["a"])
        .unwrap();
    assert_ex(
        &stmt,
        "INSERT INTO t_user (f_name) VALUES (?)\nRETURNING f_id",
        &[text("a")],
    );
}

#[test]
fn test_update_with_assignments() {
    let table = User::describe().unwrap();
    let stmt = Update::table(&table)
        .set(columns_and_values(table.fields(["Name", "Gender"]).unwrap(), [text("x"), int(2)]).unwrap())
        .where_clause(col("f_id").eq(7));
    assert_ex(
        &stmt,
        "UPDATE t_user SET f_name = ?, f_gender = ?\nWHERE f_id = ?",
        &[text("x"), int(2), int(7)],
    );
}

#[test]
fn test_delete_layout() {
    let stmt = Delete::new().from(
        &oxide_query::Table::new("T"),
        [where_clause(col("F_a").eq(1)), comment("Comment")],
    );
    assert_ex(&stmt, "DELETE FROM T\nWHERE f_a = ?\n/* Comment */", &[int(1)]);
}

#[test]
fn test_postgres_placeholders_follow_argument_order() {
    let table = User::describe().unwrap();
    let stmt = Select::new().from(
        &table,
        [
            where_clause(col("f_name").like("a")),
            where_clause(col("f_gender").in_list([1, 2])),
        ],
    );
    let ex = Postgres.finalize(stmt.ex(&RenderContext::with_dialect(&Postgres)));
    assert!(ex
        .sql()
        .ends_with("WHERE (f_name LIKE $1) AND (f_gender IN ($2,$3))"));
    assert_eq!(ex.args(), &[text("%a%"), int(1), int(2)]);
}
