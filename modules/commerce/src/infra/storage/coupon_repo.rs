use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::contract::model::Coupon;
use crate::domain::repo::CouponRepository;
use crate::infra::storage::entity::coupon::{ActiveModel as CouponAM, Column, Entity as CouponEntity};

pub struct SeaOrmCouponRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmCouponRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> CouponRepository for SeaOrmCouponRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, c: Coupon) -> anyhow::Result<Option<Coupon>> {
        let m = CouponAM {
            id: Set(c.id),
            code: Set(c.code),
            discount_percent: Set(c.discount_percent),
            created_at: Set(c.created_at),
            expires_at: Set(c.expires_at),
            usage_limit: Set(c.usage_limit),
            times_used: Set(c.times_used),
            min_cart_value: Set(c.min_cart_value),
        };
        match m.insert(&self.conn).await {
            Ok(stored) => Ok(Some(stored.into())),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(None),
            Err(e) => Err(e).context("insert coupon failed"),
        }
    }

    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Coupon>> {
        let found = CouponEntity::find()
            .filter(Column::Code.eq(code))
            .one(&self.conn)
            .await
            .context("find_by_code failed")?;
        Ok(found.map(Into::into))
    }

    async fn list(&self) -> anyhow::Result<Vec<Coupon>> {
        let rows = CouponEntity::find()
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Code)
            .all(&self.conn)
            .await
            .context("list coupons failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = CouponEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete coupon failed")?;
        Ok(res.rows_affected > 0)
    }
}
