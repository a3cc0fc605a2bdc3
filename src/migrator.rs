use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_acionamentos_table::Migration),
            Box::new(m20240101_000002_create_perdas_table::Migration),
            Box::new(m20240101_000003_create_compras_table::Migration),
            Box::new(m20240101_000004_create_usuarios_table::Migration),
        ]
    }
}

mod m20240101_000001_create_acionamentos_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_acionamentos_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Acionamentos::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Acionamentos::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Acionamentos::Data).date().not_null())
                        .col(ColumnDef::new(Acionamentos::Semana).string())
                        .col(ColumnDef::new(Acionamentos::Usina).string().not_null())
                        .col(ColumnDef::new(Acionamentos::Cliente).string())
                        .col(ColumnDef::new(Acionamentos::Equipamento).string())
                        .col(ColumnDef::new(Acionamentos::Alarme).string())
                        .col(ColumnDef::new(Acionamentos::MotivoMobilizacao).text())
                        .col(ColumnDef::new(Acionamentos::ProblemaIdentificado).text())
                        .col(ColumnDef::new(Acionamentos::SolucaoImediata).text())
                        .col(ColumnDef::new(Acionamentos::SolucaoDefinitiva).text())
                        .col(ColumnDef::new(Acionamentos::Chamado).big_integer())
                        .col(
                            ColumnDef::new(Acionamentos::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_acionamentos_data")
                        .table(Acionamentos::Table)
                        .col(Acionamentos::Data)
                        .if_not_exists()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Acionamentos::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Acionamentos {
        Table,
        Id,
        Data,
        Semana,
        Usina,
        Cliente,
        Equipamento,
        Alarme,
        MotivoMobilizacao,
        ProblemaIdentificado,
        SolucaoImediata,
        SolucaoDefinitiva,
        Chamado,
        CreatedAt,
    }
}

mod m20240101_000002_create_perdas_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_perdas_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Perdas::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Perdas::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Perdas::Data).date().not_null())
                        .col(ColumnDef::new(Perdas::Usina).string().not_null())
                        .col(ColumnDef::new(Perdas::Cmp).double())
                        .col(ColumnDef::new(Perdas::Skid).double())
                        .col(ColumnDef::new(Perdas::Inversor).double())
                        .col(ColumnDef::new(Perdas::Tcu).double())
                        .col(ColumnDef::new(Perdas::Ncu).double())
                        .col(ColumnDef::new(Perdas::StringLoss).double())
                        .col(
                            ColumnDef::new(Perdas::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Perdas::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Perdas {
        Table,
        Id,
        Data,
        Usina,
        Cmp,
        Skid,
        Inversor,
        Tcu,
        Ncu,
        #[sea_orm(iden = "string")]
        StringLoss,
        CreatedAt,
    }
}

mod m20240101_000003_create_compras_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_compras_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Compras::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Compras::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Compras::Data).date())
                        .col(ColumnDef::new(Compras::Cliente).string().not_null())
                        .col(ColumnDef::new(Compras::Usina).string())
                        .col(ColumnDef::new(Compras::Impacto).string())
                        .col(ColumnDef::new(Compras::Servico).text())
                        .col(ColumnDef::new(Compras::Valor).double().not_null())
                        .col(ColumnDef::new(Compras::FormaDePag).string().not_null())
                        .col(ColumnDef::new(Compras::NotaFiscal).string())
                        .col(ColumnDef::new(Compras::Bdi).double())
                        .col(ColumnDef::new(Compras::StatusCliente).string().not_null())
                        .col(ColumnDef::new(Compras::StatusAya).string().not_null())
                        .col(
                            ColumnDef::new(Compras::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Compras::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Compras {
        Table,
        Id,
        Data,
        Cliente,
        Usina,
        Impacto,
        Servico,
        Valor,
        FormaDePag,
        NotaFiscal,
        Bdi,
        StatusCliente,
        StatusAya,
        CreatedAt,
    }
}

mod m20240101_000004_create_usuarios_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_usuarios_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Usuarios::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Usuarios::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Usuarios::Login).string().not_null().unique_key())
                        .col(ColumnDef::new(Usuarios::Senha).string().not_null())
                        .col(ColumnDef::new(Usuarios::Nome).string())
                        .col(ColumnDef::new(Usuarios::Acessos).json().not_null())
                        .col(ColumnDef::new(Usuarios::Progresso).json().not_null())
                        .col(
                            ColumnDef::new(Usuarios::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Usuarios::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Usuarios {
        Table,
        Id,
        Login,
        Senha,
        Nome,
        Acessos,
        Progresso,
        CreatedAt,
    }
}
