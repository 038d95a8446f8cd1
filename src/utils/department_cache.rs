use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// employee_id => id of the department shard that holds the employee
pub static EMPLOYEE_DEPARTMENT: Lazy<Cache<String, u64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(3600)) // 1h TTL
        .build()
});

pub async fn remember(employee_id: &str, department_id: u64) {
    EMPLOYEE_DEPARTMENT
        .insert(employee_id.to_string(), department_id)
        .await;
}

pub async fn lookup(employee_id: &str) -> Option<u64> {
    EMPLOYEE_DEPARTMENT.get(employee_id).await
}

/// Drop a mapping after the employee moved or was deleted
pub async fn forget(employee_id: &str) {
    EMPLOYEE_DEPARTMENT.invalidate(employee_id).await;
}

async fn batch_remember(batch: &[(String, u64)]) {
    let futures: Vec<_> = batch
        .iter()
        .map(|(id, dept)| EMPLOYEE_DEPARTMENT.insert(id.clone(), *dept))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load every active employee's department into the cache (batched)
pub async fn warmup_department_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, u64)>(
        r#"
        SELECT employee_id, department_id
        FROM employees
        WHERE status = 'active'
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        batch.push(row?);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_remember(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_remember(&batch).await;
    }

    log::info!("Department cache warmup complete: {} employees", total_count);

    Ok(())
}
