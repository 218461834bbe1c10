//! OpenAPI document generation and the interactive API explorer.
//!
//! Every routed operation carries an [`OperationDoc`] entry. The document
//! served at [`SPEC_PATH`] is assembled from those entries, so adding a
//! route without describing it here leaves it undocumented (the router
//! tests check the two stay in sync).

use serde_json::{json, Map, Value};

/// Path of the generated OpenAPI document.
pub const SPEC_PATH: &str = "/apispec_1.json";

/// Path of the Swagger UI page.
pub const DOCS_PATH: &str = "/apidocs";

/// Title, version and description shown in the API explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsInfo {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Default for DocsInfo {
    fn default() -> Self {
        Self {
            title: "Student API".to_string(),
            version: "1.0".to_string(),
            description: "A simple Student CRUD API".to_string(),
        }
    }
}

/// Response schema referenced by a documented status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRef {
    Student,
    StudentList,
    Message,
    Health,
    Error,
}

impl SchemaRef {
    fn to_schema(self) -> Value {
        match self {
            SchemaRef::Student => json!({ "$ref": "#/components/schemas/Student" }),
            SchemaRef::StudentList => json!({
                "type": "array",
                "items": { "$ref": "#/components/schemas/Student" }
            }),
            SchemaRef::Message => json!({ "$ref": "#/components/schemas/Message" }),
            SchemaRef::Health => json!({ "$ref": "#/components/schemas/Health" }),
            SchemaRef::Error => json!({ "$ref": "#/components/schemas/Error" }),
        }
    }
}

/// One documented response.
#[derive(Debug, Clone, Copy)]
pub struct ResponseDoc {
    pub status: u16,
    pub description: &'static str,
    pub schema: Option<SchemaRef>,
}

/// Metadata describing a routed operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub operation_id: &'static str,
    pub tag: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    /// Description of the `{id}` path parameter, if the path has one
    pub id_param: Option<&'static str>,
    pub takes_body: bool,
    pub responses: &'static [ResponseDoc],
}

const NOT_FOUND: ResponseDoc = ResponseDoc {
    status: 404,
    description: "Student not found",
    schema: Some(SchemaRef::Error),
};

const BAD_REQUEST: ResponseDoc = ResponseDoc {
    status: 400,
    description: "Missing or malformed field in request body",
    schema: Some(SchemaRef::Error),
};

const UNSUPPORTED_MEDIA_TYPE: ResponseDoc = ResponseDoc {
    status: 415,
    description: "Request body is not JSON",
    schema: Some(SchemaRef::Error),
};

/// Documentation for every operation the router serves.
pub const OPERATIONS: &[OperationDoc] = &[
    OperationDoc {
        method: "post",
        path: "/api/v1/students",
        operation_id: "createStudent",
        tag: "Students",
        summary: "Create a new student",
        description: "Add a new student to the database",
        id_param: None,
        takes_body: true,
        responses: &[
            ResponseDoc {
                status: 201,
                description: "Student created successfully",
                schema: Some(SchemaRef::Message),
            },
            BAD_REQUEST,
            UNSUPPORTED_MEDIA_TYPE,
        ],
    },
    OperationDoc {
        method: "get",
        path: "/api/v1/students",
        operation_id: "listStudents",
        tag: "Students",
        summary: "Get all students",
        description: "Returns a list of all students",
        id_param: None,
        takes_body: false,
        responses: &[ResponseDoc {
            status: 200,
            description: "List of students",
            schema: Some(SchemaRef::StudentList),
        }],
    },
    OperationDoc {
        method: "get",
        path: "/api/v1/students/{id}",
        operation_id: "getStudent",
        tag: "Students",
        summary: "Get a specific student",
        description: "Returns a single student by ID",
        id_param: Some("ID of the student"),
        takes_body: false,
        responses: &[
            ResponseDoc {
                status: 200,
                description: "Student found",
                schema: Some(SchemaRef::Student),
            },
            NOT_FOUND,
        ],
    },
    OperationDoc {
        method: "put",
        path: "/api/v1/students/{id}",
        operation_id: "updateStudent",
        tag: "Students",
        summary: "Update a student",
        description: "Update an existing student by ID",
        id_param: Some("ID of the student"),
        takes_body: true,
        responses: &[
            ResponseDoc {
                status: 200,
                description: "Student updated successfully",
                schema: Some(SchemaRef::Message),
            },
            BAD_REQUEST,
            NOT_FOUND,
            UNSUPPORTED_MEDIA_TYPE,
        ],
    },
    OperationDoc {
        method: "delete",
        path: "/api/v1/students/{id}",
        operation_id: "deleteStudent",
        tag: "Students",
        summary: "Delete a student",
        description: "Delete a student by ID",
        id_param: Some("ID of the student to delete"),
        takes_body: false,
        responses: &[
            ResponseDoc {
                status: 200,
                description: "Student deleted successfully",
                schema: Some(SchemaRef::Message),
            },
            NOT_FOUND,
        ],
    },
    OperationDoc {
        method: "get",
        path: "/api/v1/healthcheck",
        operation_id: "healthcheck",
        tag: "Health",
        summary: "API Health Check",
        description: "Check if the API is running",
        id_param: None,
        takes_body: false,
        responses: &[ResponseDoc {
            status: 200,
            description: "API is healthy",
            schema: Some(SchemaRef::Health),
        }],
    },
];

fn operation_object(op: &OperationDoc) -> Value {
    let mut responses = Map::new();
    for response in op.responses {
        let mut entry = json!({ "description": response.description });
        if let Some(schema) = response.schema {
            entry["content"] = json!({
                "application/json": { "schema": schema.to_schema() }
            });
        }
        responses.insert(response.status.to_string(), entry);
    }

    let mut operation = json!({
        "tags": [op.tag],
        "summary": op.summary,
        "description": op.description,
        "operationId": op.operation_id,
        "responses": responses,
    });

    if let Some(description) = op.id_param {
        operation["parameters"] = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "description": description,
            "schema": { "type": "integer", "format": "int64" }
        }]);
    }

    if op.takes_body {
        operation["requestBody"] = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/StudentInput" }
                }
            }
        });
    }

    operation
}

fn component_schemas() -> Value {
    json!({
        "StudentInput": {
            "type": "object",
            "required": ["name", "age", "grade"],
            "additionalProperties": false,
            "properties": {
                "name": {
                    "type": "string",
                    "minLength": 1,
                    "maxLength": student_db_core::schema::NAME_MAX_LEN,
                    "description": "Name of the student",
                    "example": "John Doe"
                },
                "age": {
                    "type": "integer",
                    "format": "int32",
                    "description": "Age of the student",
                    "example": 20
                },
                "grade": {
                    "type": "string",
                    "maxLength": student_db_core::schema::GRADE_MAX_LEN,
                    "description": "Grade of the student",
                    "example": "A"
                }
            }
        },
        "Student": {
            "type": "object",
            "required": ["id", "name", "age", "grade"],
            "properties": {
                "id": { "type": "integer", "format": "int64", "example": 1 },
                "name": { "type": "string", "example": "John Doe" },
                "age": { "type": "integer", "format": "int32", "example": 20 },
                "grade": { "type": "string", "example": "A" }
            }
        },
        "Message": {
            "type": "object",
            "properties": {
                "message": { "type": "string", "example": "Student added successfully" }
            }
        },
        "Health": {
            "type": "object",
            "properties": {
                "status": { "type": "string", "example": "healthy" }
            }
        },
        "Error": {
            "type": "object",
            "properties": {
                "success": { "type": "boolean", "example": false },
                "error": {
                    "type": "object",
                    "properties": {
                        "code": { "type": "string", "example": "404" },
                        "message": { "type": "string" },
                        "details": { "type": "string" }
                    }
                }
            }
        }
    })
}

/// Builds the OpenAPI 3.0 document for all operations in [`OPERATIONS`].
pub fn openapi_document(info: &DocsInfo) -> Value {
    let mut paths = Map::new();
    for op in OPERATIONS {
        let item = paths
            .entry(op.path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        item[op.method] = operation_object(op);
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": info.title,
            "version": info.version,
            "description": info.description,
        },
        "tags": [
            { "name": "Students" },
            { "name": "Health" }
        ],
        "paths": paths,
        "components": { "schemas": component_schemas() },
    })
}

/// Renders the Swagger UI page pointing at `spec_url`.
pub fn swagger_ui_html(title: &str, spec_url: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {{
      window.ui = SwaggerUIBundle({{ url: "{spec_url}", dom_id: "#swagger-ui" }});
    }};
  </script>
</body>
</html>
"##
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_operation() {
        let doc = openapi_document(&DocsInfo::default());
        assert_eq!(doc["info"]["title"], "Student API");
        assert_eq!(doc["info"]["version"], "1.0");

        for op in OPERATIONS {
            let operation = &doc["paths"][op.path][op.method];
            assert_eq!(operation["operationId"], op.operation_id, "{}", op.path);
            for response in op.responses {
                assert!(operation["responses"][response.status.to_string()].is_object());
            }
        }
    }

    #[test]
    fn test_id_operations_declare_path_parameter() {
        let doc = openapi_document(&DocsInfo::default());
        let get = &doc["paths"]["/api/v1/students/{id}"]["get"];
        assert_eq!(get["parameters"][0]["name"], "id");
        assert_eq!(get["parameters"][0]["in"], "path");

        let list = &doc["paths"]["/api/v1/students"]["get"];
        assert!(list.get("parameters").is_none());
    }

    #[test]
    fn test_bodies_reference_student_input() {
        let doc = openapi_document(&DocsInfo::default());
        let create = &doc["paths"]["/api/v1/students"]["post"];
        assert_eq!(
            create["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/StudentInput"
        );
        let required = &doc["components"]["schemas"]["StudentInput"]["required"];
        assert_eq!(required, &json!(["name", "age", "grade"]));
    }

    #[test]
    fn test_swagger_page_points_at_spec() {
        let html = swagger_ui_html("Student API", SPEC_PATH);
        assert!(html.contains("<title>Student API</title>"));
        assert!(html.contains(r#"url: "/apispec_1.json""#));
    }
}
