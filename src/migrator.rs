use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_store_locations_table::Migration),
            Box::new(m20260301_000002_create_inventory_records_table::Migration),
            Box::new(m20260301_000003_create_stock_movements_table::Migration),
            Box::new(m20260301_000004_create_alert_records_table::Migration),
        ]
    }
}

mod m20260301_000001_create_store_locations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260301_000001_create_store_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StoreLocations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StoreLocations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StoreLocations::Name).string().not_null())
                        .col(ColumnDef::new(StoreLocations::ContactName).string())
                        .col(
                            ColumnDef::new(StoreLocations::ContactPhone)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StoreLocations::Address).string())
                        .col(ColumnDef::new(StoreLocations::Active).boolean().not_null())
                        .col(
                            ColumnDef::new(StoreLocations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StoreLocations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StoreLocations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StoreLocations {
        Table,
        Id,
        Name,
        ContactName,
        ContactPhone,
        Address,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260301_000002_create_inventory_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260301_000002_create_inventory_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryRecords::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(InventoryRecords::LocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::CurrentStock)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::MinimumStock)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::MaximumStock)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::IdealStockPercentage)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::RestockCycleDays)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryRecords::LastRestockDate).date())
                        .col(ColumnDef::new(InventoryRecords::NextRestockDate).date())
                        .col(
                            ColumnDef::new(InventoryRecords::AverageDailySales)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::UnitCost)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::RetailPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::StockStatus)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::NeedsRestock)
                                .boolean()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryRecords::RestockTriggerReason).string())
                        .col(ColumnDef::new(InventoryRecords::DaysUntilStockout).integer())
                        .col(ColumnDef::new(InventoryRecords::ProjectedStockoutDate).date())
                        .col(ColumnDef::new(InventoryRecords::Active).boolean().not_null())
                        .col(
                            ColumnDef::new(InventoryRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One record per (product, location) pair
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_records_product_location")
                        .table(InventoryRecords::Table)
                        .col(InventoryRecords::ProductId)
                        .col(InventoryRecords::LocationId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum InventoryRecords {
        Table,
        Id,
        ProductId,
        LocationId,
        CurrentStock,
        MinimumStock,
        MaximumStock,
        IdealStockPercentage,
        RestockCycleDays,
        LastRestockDate,
        NextRestockDate,
        AverageDailySales,
        UnitCost,
        RetailPrice,
        StockStatus,
        NeedsRestock,
        RestockTriggerReason,
        DaysUntilStockout,
        ProjectedStockoutDate,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20260301_000003_create_stock_movements_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260301_000003_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                        .col(ColumnDef::new(StockMovements::FromLocationId).uuid())
                        .col(ColumnDef::new(StockMovements::ToLocationId).uuid())
                        .col(ColumnDef::new(StockMovements::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(StockMovements::MovementType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::MovementDate).date().not_null())
                        .col(ColumnDef::new(StockMovements::Reason).string())
                        .col(ColumnDef::new(StockMovements::CreatedBy).string())
                        .col(ColumnDef::new(StockMovements::SourceStockBefore).integer())
                        .col(ColumnDef::new(StockMovements::SourceStockAfter).integer())
                        .col(ColumnDef::new(StockMovements::DestinationStockBefore).integer())
                        .col(ColumnDef::new(StockMovements::DestinationStockAfter).integer())
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_stock_movements_product")
                        .table(StockMovements::Table)
                        .col(StockMovements::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StockMovements {
        Table,
        Id,
        ProductId,
        FromLocationId,
        ToLocationId,
        Quantity,
        MovementType,
        MovementDate,
        Reason,
        CreatedBy,
        SourceStockBefore,
        SourceStockAfter,
        DestinationStockBefore,
        DestinationStockAfter,
        CreatedAt,
    }
}

mod m20260301_000004_create_alert_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260301_000004_create_alert_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AlertRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AlertRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AlertRecords::LocationId).uuid().not_null())
                        .col(ColumnDef::new(AlertRecords::ProductId).uuid().not_null())
                        .col(ColumnDef::new(AlertRecords::AlertType).string().not_null())
                        .col(ColumnDef::new(AlertRecords::Priority).string().not_null())
                        .col(ColumnDef::new(AlertRecords::Message).string().not_null())
                        .col(ColumnDef::new(AlertRecords::Status).string().not_null())
                        .col(ColumnDef::new(AlertRecords::TriggerReason).string())
                        .col(
                            ColumnDef::new(AlertRecords::ContextSnapshot)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AlertRecords::SendAt).timestamp_with_time_zone())
                        .col(ColumnDef::new(AlertRecords::RejectionReason).string())
                        .col(
                            ColumnDef::new(AlertRecords::DeliveryAttempts)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AlertRecords::ProviderReference).string())
                        .col(
                            ColumnDef::new(AlertRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AlertRecords::ApprovedAt).timestamp_with_time_zone())
                        .col(ColumnDef::new(AlertRecords::SentAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(AlertRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Supports the open-alert dedup lookup
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_alert_records_open_lookup")
                        .table(AlertRecords::Table)
                        .col(AlertRecords::LocationId)
                        .col(AlertRecords::ProductId)
                        .col(AlertRecords::AlertType)
                        .col(AlertRecords::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AlertRecords::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum AlertRecords {
        Table,
        Id,
        LocationId,
        ProductId,
        AlertType,
        Priority,
        Message,
        Status,
        TriggerReason,
        ContextSnapshot,
        SendAt,
        RejectionReason,
        DeliveryAttempts,
        ProviderReference,
        CreatedAt,
        ApprovedAt,
        SentAt,
        UpdatedAt,
    }
}
