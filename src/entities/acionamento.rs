use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Field-service mobilization tied to an equipment alarm
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "acionamentos")]
#[schema(as = Acionamento)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub data: NaiveDate,
    pub semana: Option<String>,
    pub usina: String,
    pub cliente: Option<String>,
    pub equipamento: Option<String>,
    pub alarme: Option<String>,
    pub motivo_mobilizacao: Option<String>,
    pub problema_identificado: Option<String>,
    pub solucao_imediata: Option<String>,
    pub solucao_definitiva: Option<String>,
    /// Service ticket number
    pub chamado: Option<i64>,
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
