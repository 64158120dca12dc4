//! Repository for the durable capture ledger.
//!
//! Stores the facts the in-memory inventory is a projection of: one row
//! per capture plus append-only price observations. Legacy capture rows
//! (written before creature metadata existed) have NULL name/category and
//! surface as [`CaptureRecord::Legacy`].

use crate::domain::{
    CaptureRecord, Price, PricePoint, Symbol, TimeMs, TokenAddress, TokenCategory,
};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

pub struct Repository {
    pool: SqlitePool,
}

/// One capture row, keyed by instance id.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRow {
    pub instance_id: Uuid,
    pub record: CaptureRecord,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Persist a capture. Prices are stored as canonical decimal text.
    pub async fn insert_capture(
        &self,
        instance_id: Uuid,
        address: &TokenAddress,
        symbol: &Symbol,
        name: &str,
        category: TokenCategory,
        purchase_price: Price,
        captured_at: TimeMs,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO captures \
             (instance_id, address, symbol, name, category, purchase_price, captured_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(instance_id.to_string())
        .bind(address.as_str())
        .bind(symbol.as_str())
        .bind(name)
        .bind(category.as_str())
        .bind(purchase_price.to_canonical_string())
        .bind(captured_at.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove one capture by instance id (a sale).
    pub async fn delete_capture(&self, instance_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM captures WHERE instance_id = ?")
            .bind(instance_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All capture rows, oldest first.
    pub async fn load_captures(&self) -> Result<Vec<CaptureRow>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT instance_id, address, symbol, name, category, purchase_price, captured_at \
             FROM captures ORDER BY captured_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut captures = Vec::with_capacity(rows.len());
        for row in rows {
            let instance_id: String = row.get("instance_id");
            let instance_id = Uuid::parse_str(&instance_id)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            let address = TokenAddress::new(row.get::<String, _>("address"));
            let symbol = Symbol::new(row.get::<String, _>("symbol"));
            let purchase_price: String = row.get("purchase_price");
            let purchase_price = Price::parse(&purchase_price)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            let captured_at = TimeMs::new(row.get::<i64, _>("captured_at"));

            let name: Option<String> = row.get("name");
            let category: Option<String> = row.get("category");
            let record = match (name, category) {
                (Some(name), Some(category)) => CaptureRecord::current(
                    address,
                    symbol,
                    name,
                    TokenCategory::parse_or_unknown(&category),
                    purchase_price,
                    captured_at,
                ),
                _ => CaptureRecord::legacy(address, symbol, purchase_price, captured_at),
            };
            captures.push(CaptureRow {
                instance_id,
                record,
            });
        }
        Ok(captures)
    }

    /// Append one price observation.
    pub async fn record_observation(
        &self,
        address: &TokenAddress,
        price: Price,
        observed_at: TimeMs,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO price_observations (address, price, observed_at) VALUES (?, ?, ?)",
        )
        .bind(address.as_str())
        .bind(price.to_canonical_string())
        .bind(observed_at.as_i64())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Recent observations for an address, oldest first, capped at `limit`.
    pub async fn observations_for(
        &self,
        address: &TokenAddress,
        limit: i64,
    ) -> Result<Vec<PricePoint>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT price, observed_at FROM \
             (SELECT id, price, observed_at FROM price_observations \
              WHERE address = ? ORDER BY observed_at DESC, id DESC LIMIT ?) \
             ORDER BY observed_at ASC, id ASC",
        )
        .bind(address.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let price: String = row.get("price");
                let price = Price::parse(&price).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                Ok(PricePoint {
                    price,
                    at: TimeMs::new(row.get::<i64, _>("observed_at")),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_load_capture() {
        let (repo, _tmp) = repo().await;
        let instance_id = Uuid::new_v4();
        repo.insert_capture(
            instance_id,
            &TokenAddress::new("0x1"),
            &Symbol::new("PEPE"),
            "Pepe",
            TokenCategory::Meme,
            Price::parse("100").unwrap(),
            TimeMs::new(1000),
        )
        .await
        .unwrap();

        let rows = repo.load_captures().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].instance_id, instance_id);
        let seed = rows[0].record.clone().into_seed();
        assert_eq!(seed.category, TokenCategory::Meme);
        assert_eq!(seed.purchase_price, Price::parse("100").unwrap());
    }

    #[tokio::test]
    async fn test_legacy_rows_surface_as_legacy_records() {
        let (repo, _tmp) = repo().await;
        sqlx::query(
            "INSERT INTO captures (instance_id, address, symbol, purchase_price, captured_at) \
             VALUES (?, '0xold', 'OLD', '5', 100)",
        )
        .bind(Uuid::new_v4().to_string())
        .execute(&repo.pool)
        .await
        .unwrap();

        let rows = repo.load_captures().await.unwrap();
        assert!(matches!(rows[0].record, CaptureRecord::Legacy { .. }));
        let seed = rows[0].record.clone().into_seed();
        assert_eq!(seed.category, TokenCategory::Unknown);
        assert_eq!(seed.name, "OLD");
    }

    #[tokio::test]
    async fn test_delete_capture() {
        let (repo, _tmp) = repo().await;
        let instance_id = Uuid::new_v4();
        repo.insert_capture(
            instance_id,
            &TokenAddress::new("0x1"),
            &Symbol::new("PEPE"),
            "Pepe",
            TokenCategory::Meme,
            Price::parse("100").unwrap(),
            TimeMs::new(1000),
        )
        .await
        .unwrap();

        assert!(repo.delete_capture(instance_id).await.unwrap());
        assert!(!repo.delete_capture(instance_id).await.unwrap());
        assert!(repo.load_captures().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_observations_keep_most_recent_in_order() {
        let (repo, _tmp) = repo().await;
        let addr = TokenAddress::new("0x1");
        for (price, at) in [("100", 1), ("120", 2), ("90", 3)] {
            repo.record_observation(&addr, Price::parse(price).unwrap(), TimeMs::new(at))
                .await
                .unwrap();
        }

        let recent = repo.observations_for(&addr, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].at, TimeMs::new(2));
        assert_eq!(recent[1].at, TimeMs::new(3));
        assert_eq!(recent[1].price, Price::parse("90").unwrap());

        assert!(repo
            .observations_for(&TokenAddress::new("0xmissing"), 10)
            .await
            .unwrap()
            .is_empty());
    }
}
