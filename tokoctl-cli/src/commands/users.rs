//! User commands

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use tokoctl_core::models::{Address, NewUser, User};
use tokoctl_server::db::{SortField, UserField, UserQuery, UserRepo, UserSort};

use super::CliContext;

/// Largest page the list command asks for, same as the HTTP API
const MAX_LIMIT: i64 = 100;

#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List users matching the given filters
    List(ListArgs),
    /// Show one user by id
    Show {
        /// User id
        id: i64,
    },
    /// Show the first, last or any single user
    Pick {
        #[arg(value_enum)]
        which: Pick,
    },
    /// Create a user (fails if the email is taken)
    Add(UserFields),
    /// Create a user, or update name and password when the email exists
    Upsert(UserFields),
    /// Change the name of the user with this email
    Rename {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Soft-delete a user
    Delete {
        /// User id
        id: i64,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum Pick {
    First,
    Last,
    Any,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum SortArg {
    Id,
    Name,
    #[default]
    CreatedAt,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Id => SortField::Id,
            SortArg::Name => SortField::Name,
            SortArg::CreatedAt => SortField::CreatedAt,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Exact name
    #[arg(long)]
    pub name: Option<String>,

    /// Exact email
    #[arg(long)]
    pub email: Option<String>,

    /// Match users whose name or email equals this value
    #[arg(long)]
    pub search: Option<String>,

    /// Exclude users with this name
    #[arg(long)]
    pub name_not: Option<String>,

    /// Sort column
    #[arg(long, value_enum, default_value = "created-at")]
    pub sort: SortArg,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Maximum number of users (1 to 100)
    #[arg(long, default_value_t = 20)]
    pub limit: i64,

    /// Number of users to skip
    #[arg(long, default_value_t = 0)]
    pub offset: i64,

    /// Print name and email only
    #[arg(long)]
    pub summary: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn to_query(&self) -> UserQuery {
        let any_of = self
            .search
            .as_ref()
            .map(|s| vec![UserField::Name(s.clone()), UserField::Email(s.clone())])
            .unwrap_or_default();
        let sort = if self.desc {
            UserSort::desc(self.sort.into())
        } else {
            UserSort::asc(self.sort.into())
        };

        UserQuery {
            name: self.name.clone(),
            email: self.email.clone(),
            any_of,
            name_not: self.name_not.clone(),
            sort: Some(sort),
            limit: Some(self.limit.clamp(1, MAX_LIMIT)),
            offset: (self.offset > 0).then_some(self.offset),
        }
    }
}

#[derive(Args, Debug)]
pub struct UserFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long, default_value = "")]
    pub street: String,
    #[arg(long, default_value = "")]
    pub city: String,
    #[arg(long, default_value = "")]
    pub state: String,
    #[arg(long, default_value = "")]
    pub zip_code: String,
    /// Phone number, at most 15 characters
    #[arg(long)]
    pub phone: Option<String>,
}

impl From<UserFields> for NewUser {
    fn from(f: UserFields) -> Self {
        let mut user = NewUser::new(f.name, f.email, f.password).with_address(Address {
            street: f.street,
            city: f.city,
            state: f.state,
            zip_code: f.zip_code,
        });
        user.phone_number = f.phone;
        user
    }
}

pub async fn run_users(ctx: &CliContext, args: UsersArgs) -> Result<()> {
    let pool = ctx.pool().await?;
    let repo = UserRepo::new(&pool);

    match args.command {
        UsersCommand::List(list) => {
            let query = list.to_query();
            if list.summary {
                let rows = repo.find_summaries(&query).await?;
                if list.json {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                } else {
                    for row in rows {
                        println!("{:<30} {}", row.name, row.email);
                    }
                }
            } else {
                let users = repo.find(&query).await?;
                if list.json {
                    println!("{}", serde_json::to_string_pretty(&users)?);
                } else {
                    users.iter().for_each(print_user);
                }
            }
        }
        UsersCommand::Show { id } => print_user(&repo.get(id).await?),
        UsersCommand::Pick { which } => {
            let user = match which {
                Pick::First => repo.first().await?,
                Pick::Last => repo.last().await?,
                Pick::Any => repo.take().await?,
            };
            print_user(&user);
        }
        UsersCommand::Add(fields) => {
            let user = repo
                .create(&NewUser::from(fields))
                .await
                .context("Failed to create user")?;
            println!("Created user {}", user.id);
        }
        UsersCommand::Upsert(fields) => {
            let user = repo
                .upsert_by_email(&NewUser::from(fields))
                .await
                .context("Failed to upsert user")?;
            println!("Stored user {} <{}>", user.id, user.email);
        }
        UsersCommand::Rename { email, name } => {
            let changed = repo.update_name(&email, &name).await?;
            if changed == 0 {
                anyhow::bail!("No user with email {}", email);
            }
            println!("Renamed {} user(s)", changed);
        }
        UsersCommand::Delete { id } => {
            repo.soft_delete(id).await?;
            println!("Deleted user {}", id);
        }
    }

    Ok(())
}

fn print_user(user: &User) {
    println!(
        "{:>6}  {:<30} {:<30} {}",
        user.id,
        user.name,
        user.email,
        user.address.city
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_expands_to_name_or_email() {
        let args = ListArgs {
            search: Some("budi".into()),
            desc: true,
            sort: SortArg::Name,
            limit: 5,
            ..Default::default()
        };
        let query = args.to_query();
        assert_eq!(
            query.any_of,
            vec![UserField::Name("budi".into()), UserField::Email("budi".into())]
        );
        assert_eq!(query.sort, Some(UserSort::desc(SortField::Name)));
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.offset, None);
    }

    #[test]
    fn limit_is_clamped_to_page_bounds() {
        let low = ListArgs {
            limit: -5,
            offset: -3,
            ..Default::default()
        };
        assert_eq!(low.to_query().limit, Some(1));
        assert_eq!(low.to_query().offset, None);

        let high = ListArgs {
            limit: 500,
            ..Default::default()
        };
        assert_eq!(high.to_query().limit, Some(100));
    }

    #[test]
    fn fields_become_new_user() {
        let user = NewUser::from(UserFields {
            name: "Siti Aminah".into(),
            email: "siti.aminah@example.com".into(),
            password: "rahasia456".into(),
            street: "Jl. Sudirman No. 45".into(),
            city: "Bandung".into(),
            state: "Jawa Barat".into(),
            zip_code: "40235".into(),
            phone: None,
        });
        assert_eq!(user.address.city, "Bandung");
        assert!(user.validate().is_ok());
    }
}
