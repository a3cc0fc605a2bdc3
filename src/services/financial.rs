use crate::{
    db::{observe, DbPool, FilterBuilder, PageBounds, Pagination},
    entities::compra,
    errors::ServiceError,
    normalize::{
        clean_param, clean_text, impact_label, parse_date_param, parse_loose_bool,
        parse_loose_date, parse_loose_number, upper_text, validate_record_id, Cliente, ClosedSet,
        FormaPagamento, StatusPagamento,
    },
    services::records::{body_fields, ensure_touched},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Query parameters of `GET /financial`
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FinancialListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub cliente: Option<String>,
    pub usina: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub status_cliente: Option<String>,
    pub status_aya: Option<String>,
}

/// Totals behind the financial dashboard
#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct DashboardSummary {
    /// Sum of `valor` per internal status
    pub por_status_aya: BTreeMap<String, f64>,
    /// Sum of `valor` per client-facing status
    pub por_status_cliente: BTreeMap<String, f64>,
    /// Sum of `valor` per `YYYY-MM`; undated rows are left out
    pub fluxo_mensal: BTreeMap<String, f64>,
    pub total: f64,
    pub rows: Vec<compra::Model>,
}

/// Folds rows into the dashboard totals in a single pass.
pub fn summarize(rows: Vec<compra::Model>) -> DashboardSummary {
    let mut summary = DashboardSummary::default();

    for row in &rows {
        *summary
            .por_status_aya
            .entry(row.status_aya.clone())
            .or_insert(0.0) += row.valor;
        *summary
            .por_status_cliente
            .entry(row.status_cliente.clone())
            .or_insert(0.0) += row.valor;
        if let Some(data) = row.data {
            *summary
                .fluxo_mensal
                .entry(data.format("%Y-%m").to_string())
                .or_insert(0.0) += row.valor;
        }
        summary.total += row.valor;
    }

    summary.rows = rows;
    summary
}

/// Purchase records (`compras`)
#[derive(Clone)]
pub struct FinancialService {
    db_pool: Arc<DbPool>,
}

impl FinancialService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &FinancialListParams,
    ) -> Result<Vec<compra::Model>, ServiceError> {
        let db = &*self.db_pool;
        let page = Pagination::clamp(
            params.limit.as_deref(),
            params.offset.as_deref(),
            PageBounds::FINANCIAL,
        );
        debug!(?page, "Querying compras");

        // enum filters that do not resolve to a member are dropped, not rejected
        let query = FilterBuilder::new()
            .eq(compra::Column::Cliente, canonical::<Cliente>(&params.cliente))
            .eq(
                compra::Column::Usina,
                clean_param(params.usina.as_deref()).map(|u| u.to_uppercase()),
            )
            .between(
                compra::Column::Data,
                parse_date_param(params.start.as_deref()),
                parse_date_param(params.end.as_deref()),
            )
            .eq(
                compra::Column::StatusCliente,
                canonical::<StatusPagamento>(&params.status_cliente),
            )
            .eq(
                compra::Column::StatusAya,
                canonical::<StatusPagamento>(&params.status_aya),
            )
            .apply(compra::Entity::find())
            .order_by_desc(compra::Column::Data)
            .order_by_desc(compra::Column::CreatedAt);

        Ok(observe("compras.list", page.apply(query).all(db)).await?)
    }

    /// Inserts a purchase. Both statuses start as `PENDENTE` whatever the body says.
    #[instrument(skip(self, body))]
    pub async fn create(&self, body: &Value) -> Result<compra::Model, ServiceError> {
        let db = &*self.db_pool;
        let fields = body_fields(body)?;

        let cliente = Cliente::require(fields.get("cliente"))?;
        let forma_de_pag = FormaPagamento::require(fields.get("forma_de_pag"))?;
        let valor = match clean_text(fields.get("valor")) {
            None => return Err(ServiceError::validation("valor é obrigatório")),
            Some(raw) => parse_loose_number(fields.get("valor"))
                .ok_or_else(|| ServiceError::validation(format!("valor inválido: '{}'", raw)))?,
        };
        let data = match clean_text(fields.get("data")) {
            None => None,
            Some(raw) => Some(parse_loose_date(fields.get("data")).ok_or_else(|| {
                ServiceError::validation(format!("data inválida: '{}'", raw))
            })?),
        };

        let impacto = match clean_text(fields.get("impacto")) {
            None => None,
            Some(raw) => Some(parse_loose_bool(fields.get("impacto")).ok_or_else(|| {
                ServiceError::validation(format!("impacto inválido: '{}'", raw))
            })?),
        };

        let model = compra::ActiveModel {
            id: Set(Uuid::new_v4()),
            data: Set(data),
            cliente: Set(cliente.as_str().to_string()),
            usina: Set(upper_text(fields.get("usina"))),
            impacto: Set(impacto.map(|b| impact_label(b).to_string())),
            servico: Set(clean_text(fields.get("servico"))),
            valor: Set(valor),
            forma_de_pag: Set(forma_de_pag.as_str().to_string()),
            nota_fiscal: Set(clean_text(fields.get("nota_fiscal"))),
            bdi: Set(parse_loose_number(fields.get("bdi"))),
            status_cliente: Set(StatusPagamento::Pendente.as_str().to_string()),
            status_aya: Set(StatusPagamento::Pendente.as_str().to_string()),
            ..Default::default()
        };

        let row = observe("compras.insert", model.insert(db)).await?;
        info!(id = %row.id, cliente = %row.cliente, valor = row.valor, "Compra created");
        Ok(row)
    }

    /// Updates `status_cliente`, `status_aya` and `nota_fiscal`; any other key
    /// in the body is ignored.
    #[instrument(skip(self, body))]
    pub async fn patch(&self, id: &str, body: &Value) -> Result<compra::Model, ServiceError> {
        let id = validate_record_id(id)?;
        let db = &*self.db_pool;
        let fields = body_fields(body)?;

        let mut model = <compra::ActiveModel as Default>::default();
        let mut touched = 0;
        for (key, value) in fields {
            let value = Some(value);
            match key.as_str() {
                "status_cliente" => {
                    let status = StatusPagamento::require(value)?;
                    model.status_cliente = Set(status.as_str().to_string());
                }
                "status_aya" => {
                    let status = StatusPagamento::require(value)?;
                    model.status_aya = Set(status.as_str().to_string());
                }
                "nota_fiscal" => model.nota_fiscal = Set(clean_text(value)),
                _ => continue,
            }
            touched += 1;
        }
        ensure_touched(touched)?;

        observe(
            "compras.update",
            compra::Entity::update_many()
                .set(model)
                .filter(compra::Column::Id.eq(id))
                .exec(db),
        )
        .await?;

        let row = observe("compras.find", compra::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Compra {} não encontrada", id)))?;

        info!(%id, status_cliente = %row.status_cliente, status_aya = %row.status_aya, "Compra updated");
        Ok(row)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = validate_record_id(id)?;
        let db = &*self.db_pool;

        let result = observe("compras.delete", compra::Entity::delete_by_id(id).exec(db)).await?;
        info!(%id, rows_affected = result.rows_affected, "Compra deleted");
        Ok(())
    }

    /// Full-table read for the dashboard, oldest first.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardSummary, ServiceError> {
        let db = &*self.db_pool;
        let rows = observe(
            "compras.dashboard",
            compra::Entity::find()
                .order_by_asc(compra::Column::Data)
                .all(db),
        )
        .await?;

        debug!(rows = rows.len(), "Folding dashboard");
        Ok(summarize(rows))
    }
}

fn canonical<T: ClosedSet>(raw: &Option<String>) -> Option<String> {
    clean_param(raw.as_deref())
        .and_then(|value| T::from_loose(&value))
        .map(|member| member.as_str().to_string())
}
