use hostelbyte_auth::Role;
use hostelbyte_core::{ErrorResponse, PaginationMeta, PaginationParams};
use hostelbyte_models::{
    AdminLoginRequest, ChangePasswordDto, CreateRoomDto, CreateStudentDto, LoginResponse,
    MessageResponse, PaginatedStudentsResponse, Room, RoomAllocation, RoomImportSummary, Student,
    StudentImportSummary, StudentLoginRequest, StudentSummary, UpdateRoomDto, UpdateStudentDto,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_admin,
        crate::modules::auth::controller::login_student,
        crate::modules::rooms::controller::create_room,
        crate::modules::rooms::controller::get_rooms,
        crate::modules::rooms::controller::update_room,
        crate::modules::rooms::controller::delete_room,
        crate::modules::rooms::controller::upload_rooms,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::upload_students,
        crate::modules::portal::controller::get_profile,
        crate::modules::portal::controller::change_password,
    ),
    components(
        schemas(
            Role,
            AdminLoginRequest,
            StudentLoginRequest,
            LoginResponse,
            MessageResponse,
            ErrorResponse,
            Room,
            CreateRoomDto,
            UpdateRoomDto,
            RoomImportSummary,
            Student,
            StudentSummary,
            CreateStudentDto,
            UpdateStudentDto,
            ChangePasswordDto,
            PaginatedStudentsResponse,
            StudentImportSummary,
            RoomAllocation,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Admin and student login"),
        (name = "Rooms", description = "Room administration and bulk room upload"),
        (name = "Students", description = "Occupancy-consistent enrollment and CSV import"),
        (name = "Student Portal", description = "Self-service endpoints for students")
    ),
    info(
        title = "Hostelbyte API",
        version = "0.1.0",
        description = "Hostel administration backend: rooms, student enrollment with occupancy tracking, and all-or-nothing CSV import.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_hostel_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/admin/login",
            "/api/rooms/{id}",
            "/api/students/upload",
            "/api/portal/password",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
