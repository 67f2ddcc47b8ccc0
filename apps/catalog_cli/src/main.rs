use std::sync::Arc;

use anyhow::{bail, Context, Result};
use catalog_client::{
    catalog_store::PREREQUISITE_DELETE_HINT,
    config::load_settings,
    instance_store::INSTANCE_ADDED,
    CatalogClient, CourseForm, DeletionError, DeletionState, EditSession, HttpCatalogService,
    InstanceForm, SessionState, SortOption, ViewQuery,
};
use catalog_shared::domain::{CourseId, InstanceScope, Semester, ACADEMIC_YEAR_OPTIONS};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides the configured catalog server base url.
    #[arg(long)]
    server_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Courses {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "title-asc")]
        sort: SortOption,
    },
    AddCourse {
        #[arg(long)]
        course_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        academic_year: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
        semester: u8,
        #[arg(long = "prerequisite")]
        prerequisites: Vec<String>,
    },
    UpdateCourse {
        course_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        academic_year: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
        semester: Option<u8>,
        /// Replaces the prerequisite list; pass `-` alone to clear it.
        #[arg(long = "prerequisite")]
        prerequisites: Option<Vec<String>>,
    },
    DeleteCourse {
        course_id: String,
        /// Accept the cascade over existing offerings without asking.
        #[arg(long)]
        force: bool,
    },
    Instances {
        year: i32,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=8))]
        semester: u8,
    },
    AddInstance {
        year: i32,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=8))]
        semester: u8,
        course_id: String,
    },
    RemoveInstance {
        year: i32,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=8))]
        semester: u8,
        course_id: String,
    },
}

fn semester(value: u8) -> Result<Semester> {
    Semester::new(value).with_context(|| format!("semester {value} is outside 1..=8"))
}

fn scope(year: i32, value: u8) -> Result<InstanceScope> {
    if !ACADEMIC_YEAR_OPTIONS.contains(&year) {
        warn!("instances: year={year} is not one of the offered academic years");
    }
    Ok(InstanceScope::new(year, semester(value)?))
}

fn report(state: &SessionState, success: &str) -> Result<()> {
    match state {
        SessionState::Closed => {
            println!("{success}");
            Ok(())
        }
        SessionState::DraftWithError(message) => bail!("{message}"),
        other => bail!("submission ended in unexpected state {other:?}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    let service = HttpCatalogService::from_settings(&settings)?;
    let client = CatalogClient::new(Arc::new(service));

    match cli.command {
        Command::Courses { search, sort } => {
            client.refresh_courses().await?;
            for row in client.visible_courses(&ViewQuery::new(search, sort)).await {
                let course = &row.course;
                let prerequisites = if row.prerequisite_titles.is_empty() {
                    "None".to_string()
                } else {
                    row.prerequisite_titles.join(", ")
                };
                println!(
                    "{}\t{}\t{} {}\tprerequisites: {}{}",
                    course.course_id,
                    course.title,
                    course.academic_year,
                    course.semester,
                    prerequisites,
                    if row.deletable { "" } else { "\t(locked)" }
                );
            }
        }
        Command::AddCourse {
            course_id,
            title,
            description,
            academic_year,
            semester: value,
            prerequisites,
        } => {
            client.refresh_courses().await?;
            let mut session = EditSession::<CourseForm>::create();
            session.set_course_id(course_id)?;
            session.set_title(title)?;
            session.set_description(description)?;
            session.set_academic_year(academic_year)?;
            session.set_semester(Some(semester(value)?))?;
            session.select_prerequisites(prerequisites)?;
            let state = client.submit_course(&mut session).await?;
            report(&state, "Course added.")?;
        }
        Command::UpdateCourse {
            course_id,
            title,
            description,
            academic_year,
            semester: value,
            prerequisites,
        } => {
            client.refresh_courses().await?;
            let course = client
                .course(&course_id.as_str().into())
                .await
                .with_context(|| format!("no course with id {course_id}"))?;
            let mut session = EditSession::<CourseForm>::edit(&course);
            if let Some(title) = title {
                session.set_title(title)?;
            }
            if let Some(description) = description {
                session.set_description(description)?;
            }
            if let Some(year) = academic_year {
                session.set_academic_year(year)?;
            }
            if let Some(value) = value {
                session.set_semester(Some(semester(value)?))?;
            }
            if let Some(prerequisites) = prerequisites {
                session.select_prerequisites(prerequisites)?;
            }
            let state = client.submit_course(&mut session).await?;
            report(&state, "Course updated.")?;
        }
        Command::DeleteCourse { course_id, force } => {
            client.refresh_courses().await?;
            let course_id = CourseId::from(course_id);
            let state = match client.request_course_deletion(&course_id).await {
                Ok(state) => state,
                Err(DeletionError::ReferencedAsPrerequisite(_)) => {
                    bail!("{PREREQUISITE_DELETE_HINT}")
                }
                Err(err) => return Err(err.into()),
            };
            let state = match state {
                DeletionState::ConflictPresented(conflict) if conflict.force_available() => {
                    println!("{}", conflict.message);
                    if !force {
                        bail!("re-run with --force to delete the course and its offerings");
                    }
                    client.confirm_force_delete().await?
                }
                other => other,
            };
            match state {
                DeletionState::ResolvedSuccess { course_id, forced } => {
                    println!("deleted course_id={course_id} forced={forced}");
                }
                DeletionState::ConflictPresented(conflict) => bail!("{}", conflict.message),
                other => bail!("deletion ended in unexpected state {other:?}"),
            }
        }
        Command::Instances { year, semester } => {
            for instance in client.load_instances(scope(year, semester)?).await? {
                println!("{}\t{}", instance.course.course_id, instance.course.title);
            }
        }
        Command::AddInstance {
            year,
            semester,
            course_id,
        } => {
            let mut session = EditSession::<InstanceForm>::for_scope(Some(scope(year, semester)?));
            session.select_course(course_id)?;
            let state = client.submit_instance(&mut session).await?;
            report(&state, INSTANCE_ADDED)?;
        }
        Command::RemoveInstance {
            year,
            semester,
            course_id,
        } => {
            client
                .remove_instance(scope(year, semester)?, &course_id.as_str().into())
                .await?;
            println!("removed course_id={course_id} from {year}/{semester}");
        }
    }

    Ok(())
}
