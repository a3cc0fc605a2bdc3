use crate::{
    auth::{hash_password, verify_password, PasswordCheck},
    db::{observe, DbPool},
    entities::usuario,
    errors::ServiceError,
};
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Portal users: credentials and course progress
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Checks credentials and returns the user row.
    ///
    /// A row still holding a plaintext password is re-stored as an argon2 hash
    /// once the plaintext matches.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<usuario::Model, ServiceError> {
        let db = &*self.db_pool;
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(ServiceError::InvalidCredentials);
        }

        let user = observe(
            "usuarios.find_by_login",
            usuario::Entity::find()
                .filter(usuario::Column::Login.eq(login))
                .one(db),
        )
        .await?
        .ok_or_else(|| {
            warn!(login, "Login attempt for unknown user");
            ServiceError::InvalidCredentials
        })?;

        match verify_password(&user.senha, password)? {
            PasswordCheck::Valid => {}
            PasswordCheck::ValidLegacy => {
                self.store_password(user.id, password).await?;
                info!(user_id = %user.id, "Upgraded legacy password to argon2");
            }
            PasswordCheck::Invalid => {
                warn!(user_id = %user.id, "Invalid password");
                return Err(ServiceError::InvalidCredentials);
            }
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let user = self.find(user_id).await?;
        if verify_password(&user.senha, old_password)? == PasswordCheck::Invalid {
            return Err(ServiceError::InvalidCredentials);
        }

        self.store_password(user_id, new_password).await?;
        info!(%user_id, "Password changed");
        Ok(())
    }

    /// Appends `lesson_id` unless already completed and returns the new list.
    #[instrument(skip(self))]
    pub async fn mark_progress(
        &self,
        user_id: Uuid,
        lesson_id: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let lesson_id = lesson_id.trim();
        if lesson_id.is_empty() {
            return Err(ServiceError::validation("lesson_id é obrigatório"));
        }

        let user = self.find(user_id).await?;
        let mut lessons = user.lessons();
        if lessons.iter().any(|l| l == lesson_id) {
            return Ok(lessons);
        }

        lessons.push(lesson_id.to_string());
        self.store_progress(user_id, &lessons).await?;
        info!(%user_id, lesson_id, total = lessons.len(), "Lesson marked as completed");
        Ok(lessons)
    }

    #[instrument(skip(self))]
    pub async fn reset_progress(&self, user_id: Uuid) -> Result<Vec<String>, ServiceError> {
        self.find(user_id).await?;
        self.store_progress(user_id, &[]).await?;
        info!(%user_id, "Course progress reset");
        Ok(Vec::new())
    }

    async fn find(&self, user_id: Uuid) -> Result<usuario::Model, ServiceError> {
        observe(
            "usuarios.find",
            usuario::Entity::find_by_id(user_id).one(&*self.db_pool),
        )
        .await?
        .ok_or_else(|| ServiceError::NotFound("Usuário não encontrado".to_string()))
    }

    async fn store_password(&self, user_id: Uuid, password: &str) -> Result<(), ServiceError> {
        let hash = hash_password(password)?;
        let model = usuario::ActiveModel {
            senha: Set(hash),
            ..Default::default()
        };
        observe(
            "usuarios.update_password",
            usuario::Entity::update_many()
                .set(model)
                .filter(usuario::Column::Id.eq(user_id))
                .exec(&*self.db_pool),
        )
        .await?;
        Ok(())
    }

    async fn store_progress(&self, user_id: Uuid, lessons: &[String]) -> Result<(), ServiceError> {
        let model = usuario::ActiveModel {
            progresso: Set(Value::from(lessons.to_vec())),
            ..Default::default()
        };
        observe(
            "usuarios.update_progress",
            usuario::Entity::update_many()
                .set(model)
                .filter(usuario::Column::Id.eq(user_id))
                .exec(&*self.db_pool),
        )
        .await?;
        Ok(())
    }
}
