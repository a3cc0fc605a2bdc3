use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Purchase line billed to a client
///
/// `cliente`, `forma_de_pag`, `status_cliente` and `status_aya` always hold a
/// canonical label from [`crate::normalize`].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "compras")]
#[schema(as = Compra)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub data: Option<NaiveDate>,
    pub cliente: String,
    pub usina: Option<String>,
    /// "Sim" / "Não"
    pub impacto: Option<String>,
    pub servico: Option<String>,
    pub valor: f64,
    pub forma_de_pag: String,
    pub nota_fiscal: Option<String>,
    /// Markup percentage
    pub bdi: Option<f64>,
    pub status_cliente: String,
    pub status_aya: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
