//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Simple-query protocol runs the multi-statement script in one round trip
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Incoming reports and their latest classification
CREATE TABLE IF NOT EXISTS emergency_reports (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    message TEXT,
    location TEXT,
    image_path TEXT,
    image_size BIGINT,
    vision_analysis JSONB,
    emergency_type VARCHAR(20),
    confidence REAL,
    analysis TEXT,
    details JSONB,
    classified_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Reviewer corrections (append-only)
CREATE TABLE IF NOT EXISTS classification_corrections (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    report_id UUID NOT NULL REFERENCES emergency_reports(id) ON DELETE CASCADE,
    original_type VARCHAR(20) NOT NULL,
    corrected_type VARCHAR(20) NOT NULL,
    original_confidence REAL NOT NULL,
    issue_categories TEXT[] NOT NULL DEFAULT '{}',
    ai_features JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Learned scoring adjustments
CREATE TABLE IF NOT EXISTS adaptive_rules (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    rule_type VARCHAR(50) NOT NULL,
    config_data JSONB NOT NULL,
    confidence_boost REAL NOT NULL,
    learned_from_corrections_count INT NOT NULL DEFAULT 0,
    version INT NOT NULL DEFAULT 1,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_reports_created ON emergency_reports(created_at);
CREATE INDEX IF NOT EXISTS idx_corrections_report ON classification_corrections(report_id);
CREATE INDEX IF NOT EXISTS idx_corrections_created ON classification_corrections(created_at);
CREATE INDEX IF NOT EXISTS idx_corrections_pair ON classification_corrections(original_type, corrected_type);
CREATE INDEX IF NOT EXISTS idx_rules_active ON adaptive_rules(is_active);
"#;
