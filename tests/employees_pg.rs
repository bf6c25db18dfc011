use anyhow::Result;
use employees_tests::PgTestContext;
use platform_db::{EmployeeStore, NewEmployee};
use sea_orm::ConnectionTrait;

fn new_employee(name: &str, role: &str) -> NewEmployee {
    NewEmployee {
        name: name.into(),
        role: role.into(),
    }
}

#[tokio::test]
async fn employees_round_trip_through_postgres() -> Result<()> {
    let Some(ctx) = PgTestContext::new().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set or unreachable");
        return Ok(());
    };

    assert!(ctx.store.list().await?.is_empty());

    let alice = ctx.store.create(new_employee("Alice", "Engineer")).await?;
    let bob = ctx.store.create(new_employee("Bob", "Designer")).await?;
    assert!(alice.id > 0);
    assert!(bob.id > alice.id);
    assert_eq!(ctx.store.list().await?, vec![alice.clone(), bob.clone()]);

    assert!(!ctx.store.delete(999_999).await?);
    assert!(ctx.store.delete(alice.id).await?);
    assert_eq!(ctx.store.list().await?, vec![bob]);

    ctx.store.ping().await?;
    ctx.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn constraint_violations_surface_as_errors() -> Result<()> {
    let Some(ctx) = PgTestContext::new().await else {
        eprintln!("skipping: TEST_DATABASE_URL not set or unreachable");
        return Ok(());
    };

    ctx.pool
        .execute_unprepared(
            "ALTER TABLE employees ADD CONSTRAINT short_role CHECK (length(role) < 5)",
        )
        .await?;
    let err = ctx
        .store
        .create(new_employee("Alice", "Engineer"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("short_role"));
    assert!(ctx.store.list().await?.is_empty());

    ctx.cleanup().await;
    Ok(())
}
