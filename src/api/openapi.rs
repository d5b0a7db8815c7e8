//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrowers, health, notes, records, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "1.0.0",
        description = "Book lending records, catalog, roster and notes REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::create_book,
        books::delete_book,
        // Borrowers
        borrowers::list_borrowers,
        borrowers::create_borrower,
        borrowers::delete_borrower,
        // Records
        records::list_records,
        records::get_record,
        records::create_record,
        records::delete_all_records,
        records::delete_record,
        records::begin_edit,
        records::edit_status,
        records::commit_edit,
        records::cancel_edit,
        records::sweep_overdue,
        records::reset_order,
        // Stats
        stats::get_stats,
        // Notes
        notes::list_notes,
        notes::next_id,
        notes::get_note,
        notes::create_note,
        notes::update_note,
        notes::update_notes,
        notes::delete_note,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookRef,
            books::CreateBookRequest,
            // Borrowers
            crate::models::borrower::Borrower,
            crate::models::borrower::BorrowerSummary,
            borrowers::CreateBorrowerRequest,
            // Records
            crate::models::record::Record,
            crate::models::record::RecordId,
            crate::models::record::RecordStatus,
            crate::models::record::EditToken,
            crate::models::record::SortField,
            crate::models::record::SortDirection,
            records::RecordRequest,
            records::CommitEditRequest,
            records::EditSession,
            records::EditStatus,
            records::DeleteAllResponse,
            records::SweepResponse,
            // Stats
            crate::models::stats::LibraryTotals,
            // Notes
            crate::models::note::Note,
            crate::models::note::CreateNote,
            crate::models::note::NotesListing,
            notes::NotePatch,
            notes::NextIdResponse,
            notes::MessageResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "borrowers", description = "Roster management"),
        (name = "records", description = "Lending records"),
        (name = "stats", description = "Library totals"),
        (name = "notes", description = "Notes and reminders")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
