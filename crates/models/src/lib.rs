pub mod book;
pub mod db;
pub mod errors;
pub mod user;

#[cfg(test)]
mod db_tests {
    use migration::MigratorTrait;
    use sea_orm::EntityTrait;
    use uuid::Uuid;

    use crate::{book, db, user};

    #[tokio::test]
    async fn user_and_book_round_trip() {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return;
        }
        let db = match db::connect().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return;
            }
        };
        if let Err(e) = migration::Migrator::up(&db, None).await {
            eprintln!("skip: migrate up failed: {}", e);
            return;
        }

        let email = format!("model_{}@example.com", Uuid::new_v4());
        let u = user::create(&db, &email, "Donor", "hash", "01310-100", None, user::Profile::User)
            .await
            .expect("create user");

        let book_id = Uuid::new_v4();
        let b = book::create(
            &db,
            book_id,
            u.id,
            "Grande Sertão: Veredas",
            "Guimarães Rosa",
            &format!("{book_id}.png"),
            book::FreightOption::City,
        )
        .await
        .expect("create book");
        assert!(!b.approved);

        let found = book::Entity::find_by_id(book_id).one(&db).await.expect("find").unwrap();
        assert_eq!(found.title, "Grande Sertão: Veredas");
        assert_eq!(found.user_id, u.id);

        book::Entity::delete_by_id(book_id).exec(&db).await.expect("delete book");
        user::Entity::delete_by_id(u.id).exec(&db).await.expect("delete user");
    }
}
