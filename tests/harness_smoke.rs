//! ---
//! keel_section: "07-testing-qa"
//! keel_subsection: "module"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Transactional harness smoke suite."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
use keel_testharness::TestContext;
use sqlx::Row;

// Baseline harness check: provision the managed context and open the
// transactional scope without performing any work of our own. Completing at
// all is the contract.
#[tokio::test]
async fn managed_context_smoke() {
    let harness = TestContext::provision().await.unwrap();

    harness
        .with_rollback(|uow| async move { Ok((uow, ())) })
        .await
        .unwrap();
}

#[tokio::test]
async fn rollback_leaves_no_persisted_state() {
    let harness = TestContext::provision().await.unwrap();
    sqlx::query("CREATE TABLE audit (note TEXT NOT NULL)")
        .execute(harness.context().pool())
        .await
        .unwrap();

    harness
        .with_rollback(|mut uow| async move {
            uow.execute("INSERT INTO audit (note) VALUES ('inside the scope')")
                .await?;
            Ok((uow, ()))
        })
        .await
        .unwrap();

    let row = sqlx::query("SELECT COUNT(*) FROM audit")
        .fetch_one(harness.context().pool())
        .await
        .unwrap();
    assert_eq!(row.get::<i64, _>(0), 0);
}
