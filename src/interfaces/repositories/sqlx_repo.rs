use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxCommentRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxImageSetRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxStatsRepo {
    pub pool: PgPool,
}
