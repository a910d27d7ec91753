use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgConnection, PgPool, Row};

use crate::model::{
    Bank, Developer, DeveloperProject, Id, NewDeveloperProject, NewOwner, NewProject,
    NewProjectPermission, NewProperty, Owner, Permission, Project, ProjectPermission, Property,
    PropertyDetails, Resolved, SavedProject,
};
use crate::store::traits::{
    BankStore, DeveloperProjectStore, DeveloperStore, OwnerStore, PermissionStore, ProjectStore,
    PropertyStore,
};

const OWNER_COLUMNS: &str = "id, name, occupation, pan_number, date_of_purchase, loan_from, \
     cost_of_purchase, is_resale, name_of_seller, contact_number_seller, email_seller, co_owner_id";

const PROPERTY_COLUMNS: &str = "id, developer_id, address_line_one, address_line_two, city, state, \
     pin_code, property_type, specifications, built_up_area, total_area, number_of_bedrooms, \
     number_of_bathrooms, number_of_parking_spaces, connectivity, neighborhood_quality, comments";

const DEVELOPER_PROJECT_COLUMNS: &str = "id, developer_id, project_name, launch_date_month, \
     launch_date_year, possession_date_month, possession_date_year";

const PROJECT_SELECT: &str = r#"
    SELECT p.id, p.name, p.launch_date, p.possession_date,
           COALESCE(array_agg(pb.bank_id ORDER BY pb.bank_id) FILTER (WHERE pb.bank_id IS NOT NULL), '{}') AS bank_ids
    FROM projects p
    LEFT JOIN project_banks pb ON pb.project_id = p.id
"#;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    async fn named(&self, table: &'static str, name: &str) -> Result<Resolved<(Id, String)>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        get_or_create_named(&mut *conn, table, name).await
    }

    async fn fetch_project(&self, id: Id) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "{PROJECT_SELECT} WHERE p.id = $1 GROUP BY p.id"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch project")?;

        Ok(row.as_ref().map(project_from_row))
    }
}

/// Insert-or-ignore on a unique `name` column, then read back the canonical row.
/// Used for every table whose natural key is a single unique name.
async fn get_or_create_named(
    conn: &mut PgConnection,
    table: &'static str,
    name: &str,
) -> Result<Resolved<(Id, String)>> {
    let inserted = sqlx::query(&format!(
        "INSERT INTO {table} (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id, name"
    ))
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .with_context(|| format!("Failed to insert into {table}"))?;

    if let Some(row) = inserted {
        return Ok(Resolved::created((row.get("id"), row.get("name"))));
    }

    let row = sqlx::query(&format!(
        "SELECT id, name FROM {table} WHERE name = $1 ORDER BY id LIMIT 1"
    ))
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("Failed to look up {table} by name"))?;

    Ok(Resolved::existing((row.get("id"), row.get("name"))))
}

fn parse_choice<T>(value: Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(value.map(|v| v.parse::<T>()).transpose()?)
}

fn owner_from_row(row: &PgRow) -> Owner {
    Owner {
        id: row.get("id"),
        name: row.get("name"),
        occupation: row.get("occupation"),
        pan_number: row.get("pan_number"),
        date_of_purchase: row.get("date_of_purchase"),
        loan_from: row.get("loan_from"),
        cost_of_purchase: row.get("cost_of_purchase"),
        is_resale: row.get("is_resale"),
        name_of_seller: row.get("name_of_seller"),
        contact_number_seller: row.get("contact_number_seller"),
        email_seller: row.get("email_seller"),
        co_owner_id: row.get("co_owner_id"),
    }
}

fn property_from_row(row: &PgRow) -> Result<Property> {
    Ok(Property {
        id: row.get("id"),
        developer_id: row.get("developer_id"),
        address_line_one: row.get("address_line_one"),
        address_line_two: row.get("address_line_two"),
        city: row.get("city"),
        state: row.get("state"),
        pin_code: row.get("pin_code"),
        property_type: parse_choice(row.get("property_type"))?,
        specifications: parse_choice(row.get("specifications"))?,
        built_up_area: row.get("built_up_area"),
        total_area: row.get("total_area"),
        number_of_bedrooms: row.get("number_of_bedrooms"),
        number_of_bathrooms: row.get("number_of_bathrooms"),
        number_of_parking_spaces: parse_choice(row.get("number_of_parking_spaces"))?,
        details: PropertyDetails {
            connectivity: row.get("connectivity"),
            neighborhood_quality: row.get("neighborhood_quality"),
            comments: row.get("comments"),
        },
    })
}

fn developer_project_from_row(row: &PgRow) -> Result<DeveloperProject> {
    Ok(DeveloperProject {
        id: row.get("id"),
        developer_id: row.get("developer_id"),
        project_name: row.get("project_name"),
        launch_date_month: row.get::<String, _>("launch_date_month").parse()?,
        launch_date_year: row.get("launch_date_year"),
        possession_date_month: row.get::<String, _>("possession_date_month").parse()?,
        possession_date_year: row.get("possession_date_year"),
    })
}

fn project_from_row(row: &PgRow) -> Project {
    Project {
        id: row.get("id"),
        name: row.get("name"),
        launch_date: row.get("launch_date"),
        possession_date: row.get("possession_date"),
        bank_ids: row.get("bank_ids"),
    }
}

fn project_permission_from_row(row: &PgRow) -> ProjectPermission {
    ProjectPermission {
        id: row.get("id"),
        project_id: row.get("project_id"),
        permission_id: row.get("permission_id"),
        value: row.get("value"),
    }
}

#[async_trait::async_trait]
impl DeveloperStore for PostgresStore {
    async fn get_developer(&self, id: Id) -> Result<Option<Developer>> {
        let row = sqlx::query("SELECT id, name FROM developers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch developer")?;

        Ok(row.map(|row| Developer {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    async fn list_developers(&self) -> Result<Vec<Developer>> {
        let rows = sqlx::query("SELECT id, name FROM developers ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list developers")?;

        Ok(rows
            .into_iter()
            .map(|row| Developer {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn get_or_create_developer(&self, name: &str) -> Result<Resolved<Developer>> {
        let resolved = self.named("developers", name).await?;
        let (id, name) = resolved.record;
        Ok(Resolved {
            record: Developer { id, name },
            created: resolved.created,
        })
    }
}

#[async_trait::async_trait]
impl BankStore for PostgresStore {
    async fn get_bank(&self, id: Id) -> Result<Option<Bank>> {
        let row = sqlx::query("SELECT id, name FROM banks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch bank")?;

        Ok(row.map(|row| Bank {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    async fn list_banks(&self) -> Result<Vec<Bank>> {
        let rows = sqlx::query("SELECT id, name FROM banks ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list banks")?;

        Ok(rows
            .into_iter()
            .map(|row| Bank {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn get_or_create_bank(&self, name: &str) -> Result<Resolved<Bank>> {
        let resolved = self.named("banks", name).await?;
        let (id, name) = resolved.record;
        Ok(Resolved {
            record: Bank { id, name },
            created: resolved.created,
        })
    }
}

#[async_trait::async_trait]
impl OwnerStore for PostgresStore {
    async fn get_owner(&self, id: Id) -> Result<Option<Owner>> {
        let row = sqlx::query(&format!("SELECT {OWNER_COLUMNS} FROM owners WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch owner")?;

        Ok(row.as_ref().map(owner_from_row))
    }

    async fn list_owners(&self) -> Result<Vec<Owner>> {
        let rows = sqlx::query(&format!("SELECT {OWNER_COLUMNS} FROM owners ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list owners")?;

        Ok(rows.iter().map(owner_from_row).collect())
    }

    async fn insert_owner(&self, owner: NewOwner) -> Result<Owner> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO owners (name, occupation, pan_number, date_of_purchase, loan_from,
                cost_of_purchase, is_resale, name_of_seller, contact_number_seller, email_seller, co_owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {OWNER_COLUMNS}
            "#
        ))
        .bind(&owner.name)
        .bind(&owner.occupation)
        .bind(&owner.pan_number)
        .bind(owner.date_of_purchase)
        .bind(&owner.loan_from)
        .bind(owner.cost_of_purchase)
        .bind(owner.is_resale)
        .bind(&owner.name_of_seller)
        .bind(&owner.contact_number_seller)
        .bind(&owner.email_seller)
        .bind(owner.co_owner_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert owner")?;

        Ok(owner_from_row(&row))
    }

    async fn get_or_create_owner(&self, name: &str, occupation: &str) -> Result<Resolved<Owner>> {
        // Owners have no unique key (two people may share a name and job), so the
        // lookup-then-insert is serialized per key with a transaction advisory lock.
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
            .bind(name)
            .bind(occupation)
            .execute(&mut *tx)
            .await
            .context("Failed to lock owner key")?;

        let existing = sqlx::query(&format!(
            "SELECT {OWNER_COLUMNS} FROM owners WHERE name = $1 AND occupation = $2 ORDER BY id LIMIT 1"
        ))
        .bind(name)
        .bind(occupation)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to look up owner")?;

        let resolved = match existing {
            Some(row) => Resolved::existing(owner_from_row(&row)),
            None => {
                let row = sqlx::query(&format!(
                    "INSERT INTO owners (name, occupation) VALUES ($1, $2) RETURNING {OWNER_COLUMNS}"
                ))
                .bind(name)
                .bind(occupation)
                .fetch_one(&mut *tx)
                .await
                .context("Failed to insert owner")?;
                Resolved::created(owner_from_row(&row))
            }
        };

        tx.commit().await.context("Failed to commit owner")?;
        Ok(resolved)
    }
}

#[async_trait::async_trait]
impl PropertyStore for PostgresStore {
    async fn get_property(&self, id: Id) -> Result<Option<Property>> {
        let row = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch property")?;

        row.as_ref().map(property_from_row).transpose()
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list properties")?;

        rows.iter().map(property_from_row).collect()
    }

    async fn insert_property(&self, property: NewProperty) -> Result<Property> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO properties (developer_id, address_line_one, address_line_two, city, state,
                pin_code, property_type, specifications, built_up_area, total_area,
                number_of_bedrooms, number_of_bathrooms, number_of_parking_spaces)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(property.developer_id)
        .bind(&property.address_line_one)
        .bind(&property.address_line_two)
        .bind(&property.city)
        .bind(&property.state)
        .bind(&property.pin_code)
        .bind(property.property_type.map(|t| t.label()))
        .bind(property.specifications.map(|s| s.label()))
        .bind(property.built_up_area)
        .bind(property.total_area)
        .bind(property.number_of_bedrooms)
        .bind(property.number_of_bathrooms)
        .bind(property.number_of_parking_spaces.map(|p| p.label()))
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert property")?;

        property_from_row(&row)
    }

    async fn update_property_details(
        &self,
        id: Id,
        details: PropertyDetails,
    ) -> Result<Option<Property>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE properties
            SET connectivity = $2, neighborhood_quality = $3, comments = $4
            WHERE id = $1
            RETURNING {PROPERTY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&details.connectivity)
        .bind(&details.neighborhood_quality)
        .bind(&details.comments)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update property details")?;

        row.as_ref().map(property_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl DeveloperProjectStore for PostgresStore {
    async fn get_developer_project(&self, id: Id) -> Result<Option<DeveloperProject>> {
        let row = sqlx::query(&format!(
            "SELECT {DEVELOPER_PROJECT_COLUMNS} FROM developer_projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch developer project")?;

        row.as_ref().map(developer_project_from_row).transpose()
    }

    async fn insert_developer_project(
        &self,
        project: NewDeveloperProject,
    ) -> Result<DeveloperProject> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO developer_projects (developer_id, project_name, launch_date_month,
                launch_date_year, possession_date_month, possession_date_year)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DEVELOPER_PROJECT_COLUMNS}
            "#
        ))
        .bind(project.developer_id)
        .bind(&project.project_name)
        .bind(project.launch_date_month.label())
        .bind(project.launch_date_year)
        .bind(project.possession_date_month.label())
        .bind(project.possession_date_year)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert developer project")?;

        developer_project_from_row(&row)
    }
}

#[async_trait::async_trait]
impl ProjectStore for PostgresStore {
    async fn get_project(&self, id: Id) -> Result<Option<Project>> {
        self.fetch_project(id).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query(&format!("{PROJECT_SELECT} GROUP BY p.id ORDER BY p.id"))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list projects")?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    async fn create_project(&self, project: NewProject) -> Result<SavedProject> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let project_id: Id = sqlx::query(
            "INSERT INTO projects (name, launch_date, possession_date) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&project.name)
        .bind(project.launch_date)
        .bind(project.possession_date)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert project")?
        .get("id");

        let added_bank = match project.new_bank.as_deref() {
            Some(name) => {
                let (id, name) = get_or_create_named(&mut *tx, "banks", name).await?.record;
                Some(Bank { id, name })
            }
            None => None,
        };

        let bank_ids = project
            .bank_ids
            .iter()
            .copied()
            .chain(added_bank.as_ref().map(|b| b.id));
        for bank_id in bank_ids {
            sqlx::query(
                "INSERT INTO project_banks (project_id, bank_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(project_id)
            .bind(bank_id)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to associate bank {bank_id}"))?;
        }

        let row = sqlx::query(&format!(
            "{PROJECT_SELECT} WHERE p.id = $1 GROUP BY p.id"
        ))
        .bind(project_id)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to read back project")?;
        let saved = project_from_row(&row);

        tx.commit().await.context("Failed to commit project")?;

        Ok(SavedProject {
            project: saved,
            added_bank,
        })
    }
}

#[async_trait::async_trait]
impl PermissionStore for PostgresStore {
    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let rows = sqlx::query("SELECT id, name FROM permissions ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list permissions")?;

        Ok(rows
            .into_iter()
            .map(|row| Permission {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn define_permission(&self, name: &str) -> Result<Resolved<Permission>> {
        let resolved = self.named("permissions", name).await?;
        let (id, name) = resolved.record;
        Ok(Resolved {
            record: Permission { id, name },
            created: resolved.created,
        })
    }

    async fn insert_project_permissions(
        &self,
        project_id: Id,
        rows: Vec<NewProjectPermission>,
    ) -> Result<Vec<ProjectPermission>> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        let mut inserted = Vec::with_capacity(rows.len());

        for row in rows {
            let record = sqlx::query(
                r#"
                INSERT INTO project_permissions (project_id, permission_id, value)
                VALUES ($1, $2, $3)
                RETURNING id, project_id, permission_id, value
                "#,
            )
            .bind(project_id)
            .bind(row.permission_id)
            .bind(&row.value)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to insert project permission")?;
            inserted.push(project_permission_from_row(&record));
        }

        tx.commit()
            .await
            .context("Failed to commit project permissions")?;
        Ok(inserted)
    }

    async fn list_project_permissions(&self, project_id: Id) -> Result<Vec<ProjectPermission>> {
        let rows = sqlx::query(
            "SELECT id, project_id, permission_id, value FROM project_permissions WHERE project_id = $1 ORDER BY id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list project permissions")?;

        Ok(rows.iter().map(project_permission_from_row).collect())
    }
}
