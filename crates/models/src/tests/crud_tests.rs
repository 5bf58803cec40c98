use crate::db::connect_in_memory;
use crate::service::ServiceFields;
use crate::{category, menu_button, service};
use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::{DatabaseConnection, EntityTrait, ModelTrait};

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn fields(name: &str) -> ServiceFields {
    ServiceFields { name: name.to_string(), ..Default::default() }
}

#[tokio::test]
async fn test_category_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let created = category::create(&db, "  Послуги краси ", Some("💅")).await?;
    assert_eq!(created.name, "Послуги краси");
    assert_eq!(created.label(), "💅 Послуги краси");

    let found = category::find_by_name(&db, "Послуги краси").await?;
    assert_eq!(found.map(|c| c.id), Some(created.id));

    // Unique name
    assert!(category::create(&db, "Послуги краси", None).await.is_err());

    category::Entity::delete_by_id(created.id).exec(&db).await?;
    assert!(category::Entity::find_by_id(created.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_service_create_and_relation() -> Result<()> {
    let db = setup_test_db().await?;
    let cat = category::create(&db, "Автомобільний сервіс", Some("🚗")).await?;

    let svc = service::create(
        &db,
        cat.id,
        ServiceFields {
            name: "Шиномонтаж".into(),
            address: Some("вул. Шевченка, 1".into()),
            phone: Some("  ".into()),
            ..Default::default()
        },
        Some((51.82, 31.95)),
    )
    .await?;
    assert_eq!(svc.phone, None, "blank optionals are stored as NULL");
    assert_eq!(svc.coordinates(), Some((51.82, 31.95)));

    let owner = svc.find_related(category::Entity).one(&db).await?;
    assert_eq!(owner.map(|c| c.id), Some(cat.id));

    let owned = cat.find_related(service::Entity).all(&db).await?;
    assert_eq!(owned.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_service_name_unique_per_category() -> Result<()> {
    let db = setup_test_db().await?;
    let a = category::create(&db, "A", None).await?;
    let b = category::create(&db, "B", None).await?;

    service::create(&db, a.id, fields("Майстерня"), None).await?;
    assert!(service::create(&db, a.id, fields("Майстерня"), None).await.is_err());
    // Same name in another category is fine
    service::create(&db, b.id, fields("Майстерня"), None).await?;
    Ok(())
}

#[tokio::test]
async fn test_menu_button_tree() -> Result<()> {
    let db = setup_test_db().await?;
    let root = menu_button::create(&db, "Транспорт", None).await?;
    let child = menu_button::create(&db, "Автобуси", Some(root.id)).await?;
    assert_eq!(child.parent_id, Some(root.id));

    let all = menu_button::Entity::find().all(&db).await?;
    assert_eq!(all.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_connect_with_config_pool() -> Result<()> {
    let cfg = crate::db::DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout_secs: 5,
        idle_timeout_secs: 60,
        acquire_timeout_secs: 5,
        sqlx_logging: false,
    };
    let db = crate::db::connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;

    category::create(&db, "Розклад транспорту", Some("🚌")).await?;
    assert_eq!(category::Entity::find().all(&db).await?.len(), 1);
    Ok(())
}
