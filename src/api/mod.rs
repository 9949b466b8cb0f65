// src/api/mod.rs
// Endpoint catalogue of the service under test

pub mod types;

pub use types::{
    ApiResponse, AuthResponse, CompileRequest, FolderDraft, LoginRequest, ProjectDraft,
    ProjectPatch, RegisterRequest, ResourceRecord, Schema, UsageStats, UserRecord,
};

use crate::http::RequestSpec;

// Health & info

pub fn health() -> RequestSpec {
    RequestSpec::get("health")
}

/// Root of the API, returns service information
pub fn service_info() -> RequestSpec {
    RequestSpec::get("")
}

// Authentication

pub fn register(request: &RegisterRequest) -> RequestSpec {
    RequestSpec::post("auth/register")
        .json(request)
        .returning(Schema::Session)
}

pub fn login(request: &LoginRequest) -> RequestSpec {
    RequestSpec::post("auth/login")
        .json(request)
        .returning(Schema::Session)
}

pub fn me() -> RequestSpec {
    RequestSpec::get("auth/me")
        .authenticated()
        .returning(Schema::User)
}

// Folders

pub fn list_folders() -> RequestSpec {
    RequestSpec::get("folders")
        .authenticated()
        .returning(Schema::Listing)
}

pub fn create_folder(draft: &FolderDraft) -> RequestSpec {
    RequestSpec::post("folders")
        .json(draft)
        .authenticated()
        .returning(Schema::Resource)
}

pub fn update_folder(id: &str, draft: &FolderDraft) -> RequestSpec {
    RequestSpec::put(format!("folders/{id}"))
        .json(draft)
        .authenticated()
}

pub fn delete_folder(id: &str) -> RequestSpec {
    RequestSpec::delete(format!("folders/{id}")).authenticated()
}

// Projects

/// List projects. `Some("")` asks for projects at the root (no folder).
pub fn list_projects(folder_id: Option<&str>) -> RequestSpec {
    let path = match folder_id {
        Some(folder) => format!("projects?folder_id={folder}"),
        None => "projects".to_string(),
    };
    RequestSpec::get(path)
        .authenticated()
        .returning(Schema::Listing)
}

pub fn create_project(draft: &ProjectDraft) -> RequestSpec {
    RequestSpec::post("projects")
        .json(draft)
        .authenticated()
        .returning(Schema::Resource)
}

pub fn get_project(id: &str) -> RequestSpec {
    RequestSpec::get(format!("projects/{id}"))
        .authenticated()
        .returning(Schema::Resource)
}

pub fn update_project(id: &str, patch: &ProjectPatch) -> RequestSpec {
    RequestSpec::put(format!("projects/{id}"))
        .json(patch)
        .authenticated()
}

pub fn delete_project(id: &str) -> RequestSpec {
    RequestSpec::delete(format!("projects/{id}")).authenticated()
}

/// Record a play event for a project
pub fn play_project(id: &str) -> RequestSpec {
    RequestSpec::post(format!("projects/{id}/play")).authenticated()
}

// Compilation & analytics

pub fn compile(request: &CompileRequest) -> RequestSpec {
    RequestSpec::post("jmon/compile")
        .json(request)
        .authenticated()
}

pub fn usage_stats() -> RequestSpec {
    RequestSpec::get("analytics/stats")
        .authenticated()
        .returning(Schema::Stats)
}

pub fn activity(days: Option<u32>) -> RequestSpec {
    let path = match days {
        Some(days) => format!("analytics/activity?days={days}"),
        None => "analytics/activity".to_string(),
    };
    RequestSpec::get(path)
        .authenticated()
        .returning(Schema::Activity)
}
