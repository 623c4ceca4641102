//! The tool catalog: descriptors (what callers see) and endpoint mappings (what the gateway sees).
//!
//! A catalog is built once at startup and is immutable afterwards, so a single `Arc<ToolCatalog>`
//! is shared by every transport.

use crate::error::{Result, ToolError};
use crate::resolver::{RESERVED_PATH_ARGUMENTS, template_placeholders};
use reqwest::Method;
use rmcp::model::{JsonObject, Tool};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One caller-visible operation.
///
/// `input_schema` documents the expected arguments; it is never enforced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMapping {
    pub tool_name: String,
    pub method: Method,
    /// Path with `{placeholder}` segments, e.g. `/bitable/apps/{app_token}`.
    pub path_template: String,
}

#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
    endpoints: HashMap<String, EndpointMapping>,
}

impl ToolCatalog {
    /// Build a catalog from descriptors and endpoint mappings.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Config`] if a name is duplicated, if a descriptor has no mapping (or a
    /// mapping has no descriptor), or if a path template uses a placeholder outside the reserved
    /// set.
    pub fn new(tools: Vec<ToolDescriptor>, endpoints: Vec<EndpointMapping>) -> Result<Self> {
        let mut names: HashSet<&str> = HashSet::new();
        for tool in &tools {
            if !names.insert(tool.name.as_str()) {
                return Err(ToolError::Config(format!(
                    "Duplicate tool name '{}'",
                    tool.name
                )));
            }
        }

        let mut by_name: HashMap<String, EndpointMapping> = HashMap::new();
        for endpoint in endpoints {
            if !names.contains(endpoint.tool_name.as_str()) {
                return Err(ToolError::Config(format!(
                    "Endpoint mapping for '{}' has no tool descriptor",
                    endpoint.tool_name
                )));
            }
            for placeholder in template_placeholders(&endpoint.path_template) {
                if !RESERVED_PATH_ARGUMENTS.contains(&placeholder) {
                    return Err(ToolError::Config(format!(
                        "Path template '{}' for tool '{}' uses unsupported placeholder '{placeholder}'",
                        endpoint.path_template, endpoint.tool_name
                    )));
                }
            }
            if by_name.contains_key(&endpoint.tool_name) {
                return Err(ToolError::Config(format!(
                    "Duplicate endpoint mapping for '{}'",
                    endpoint.tool_name
                )));
            }
            by_name.insert(endpoint.tool_name.clone(), endpoint);
        }

        if let Some(missing) = tools.iter().find(|t| !by_name.contains_key(&t.name)) {
            return Err(ToolError::Config(format!(
                "Tool '{}' has no endpoint mapping",
                missing.name
            )));
        }

        Ok(Self {
            tools,
            endpoints: by_name,
        })
    }

    /// The built-in Bitable catalog (15 tools).
    #[must_use]
    pub fn bitable() -> Self {
        let mut tools = Vec::new();
        let mut endpoints = HashMap::new();
        for def in bitable_tools() {
            tools.push(ToolDescriptor {
                name: def.name.to_string(),
                description: def.description.to_string(),
                input_schema: (def.schema)(),
            });
            endpoints.insert(
                def.name.to_string(),
                EndpointMapping {
                    tool_name: def.name.to_string(),
                    method: def.method,
                    path_template: def.path.to_string(),
                },
            );
        }
        Self { tools, endpoints }
    }

    /// Descriptors in declaration order.
    #[must_use]
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub fn endpoint(&self, tool_name: &str) -> Option<&EndpointMapping> {
        self.endpoints.get(tool_name)
    }

    /// Render the catalog as MCP `Tool`s, annotated from each endpoint's HTTP method.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| {
                let schema_obj = t
                    .input_schema
                    .as_object()
                    .cloned()
                    .unwrap_or_else(JsonObject::new);
                let mut tool = Tool::new(t.name.clone(), t.description.clone(), Arc::new(schema_obj));
                tool.annotations = self
                    .endpoints
                    .get(&t.name)
                    .map(|e| crate::semantics::annotations_for_method(&e.method));
                tool
            })
            .collect()
    }
}

struct ToolDefinition {
    name: &'static str,
    description: &'static str,
    method: Method,
    path: &'static str,
    schema: fn() -> Value,
}

const APPS: &str = "/bitable/apps";
const APP: &str = "/bitable/apps/{app_token}";
const TABLES: &str = "/bitable/apps/{app_token}/tables";
const TABLE: &str = "/bitable/apps/{app_token}/tables/{table_id}";
const FIELDS: &str = "/bitable/apps/{app_token}/tables/{table_id}/fields";
const FIELD: &str = "/bitable/apps/{app_token}/tables/{table_id}/fields/{field_id}";
const RECORDS: &str = "/bitable/apps/{app_token}/tables/{table_id}/records";
const RECORD: &str = "/bitable/apps/{app_token}/tables/{table_id}/records/{record_id}";
const RECORDS_BATCH_CREATE: &str =
    "/bitable/apps/{app_token}/tables/{table_id}/records/batch_create";
const RECORDS_SEARCH: &str = "/bitable/apps/{app_token}/tables/{table_id}/records/search";
const RECORDS_BATCH_UPDATE: &str =
    "/bitable/apps/{app_token}/tables/{table_id}/records/batch_update";

fn bitable_tools() -> [ToolDefinition; 15] {
    [
        // Apps
        ToolDefinition {
            name: "bitable_create_app",
            description: "Create a new Bitable (Base) app in a specified folder",
            method: Method::POST,
            path: APPS,
            schema: create_app_schema,
        },
        ToolDefinition {
            name: "bitable_get_app",
            description: "Get details about a Bitable app including metadata and table count",
            method: Method::GET,
            path: APP,
            schema: get_app_schema,
        },
        ToolDefinition {
            name: "bitable_list_apps",
            description: "List all accessible Bitable apps for the current user",
            method: Method::GET,
            path: APPS,
            schema: list_apps_schema,
        },
        // Tables
        ToolDefinition {
            name: "bitable_create_table",
            description: "Create a new table in a Bitable app with specified fields and default view",
            method: Method::POST,
            path: TABLES,
            schema: create_table_schema,
        },
        ToolDefinition {
            name: "bitable_list_tables",
            description: "List all tables in a Bitable app",
            method: Method::GET,
            path: TABLES,
            schema: list_tables_schema,
        },
        ToolDefinition {
            name: "bitable_get_table",
            description: "Get details about a specific table including field count and record count",
            method: Method::GET,
            path: TABLE,
            schema: get_table_schema,
        },
        ToolDefinition {
            name: "bitable_delete_table",
            description: "Delete a table from a Bitable app (WARNING: This action cannot be undone)",
            method: Method::DELETE,
            path: TABLE,
            schema: delete_table_schema,
        },
        // Fields
        ToolDefinition {
            name: "bitable_list_fields",
            description: "List all fields (columns) in a Bitable table with their types and properties",
            method: Method::GET,
            path: FIELDS,
            schema: list_fields_schema,
        },
        ToolDefinition {
            name: "bitable_create_field",
            description: "Create a new field (column) in a Bitable table. Field types: 1=Text, 2=Number, \
                          3=SingleSelect, 4=MultiSelect, 5=DateTime, 7=Checkbox, 11=User, 13=Phone, \
                          15=URL, 17=Attachment, 18=Link, 20=Formula, 21=DuplexLink, 22=Location",
            method: Method::POST,
            path: FIELDS,
            schema: create_field_schema,
        },
        ToolDefinition {
            name: "bitable_update_field",
            description: "Update field properties such as name, options, or formula",
            method: Method::PUT,
            path: FIELD,
            schema: update_field_schema,
        },
        // Records
        ToolDefinition {
            name: "bitable_create_record",
            description: "Create a single record in a Bitable table",
            method: Method::POST,
            path: RECORDS,
            schema: create_record_schema,
        },
        ToolDefinition {
            name: "bitable_batch_create_records",
            description: "Create multiple records at once in a Bitable table (up to 500 records)",
            method: Method::POST,
            path: RECORDS_BATCH_CREATE,
            schema: batch_create_records_schema,
        },
        ToolDefinition {
            name: "bitable_search_records",
            description: "Search and filter records in a Bitable table with advanced query options. \
                          Supports filtering, sorting, and pagination. Max 500 records per request.",
            method: Method::POST,
            path: RECORDS_SEARCH,
            schema: search_records_schema,
        },
        ToolDefinition {
            name: "bitable_update_record",
            description: "Update a single record in a Bitable table",
            method: Method::PUT,
            path: RECORD,
            schema: update_record_schema,
        },
        ToolDefinition {
            name: "bitable_batch_update_records",
            description: "Update multiple records at once in a Bitable table (up to 500 records)",
            method: Method::PUT,
            path: RECORDS_BATCH_UPDATE,
            schema: batch_update_records_schema,
        },
    ]
}

fn app_token() -> Value {
    json!({ "type": "string", "description": "Bitable app token (e.g., 'bascnXXX...')" })
}

fn table_id() -> Value {
    json!({ "type": "string", "description": "Table ID (e.g., 'tblXXX...')" })
}

fn page_token() -> Value {
    json!({ "type": "string", "description": "Page token for pagination" })
}

fn create_app_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "App name (e.g., 'Project Tracker', 'CRM Database')"
            },
            "folder_token": {
                "type": "string",
                "description": "Optional folder token to create app in. Leave empty for root folder."
            }
        },
        "required": ["name"]
    })
}

fn get_app_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "app_token": app_token() },
        "required": ["app_token"]
    })
}

fn list_apps_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "page_size": {
                "type": "number",
                "description": "Number of apps to return per page (default: 20, max: 100)"
            },
            "page_token": page_token()
        }
    })
}

fn create_table_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_name": { "type": "string", "description": "Name for the new table" },
            "default_view_name": {
                "type": "string",
                "description": "Optional name for the default view"
            },
            "fields": {
                "type": "array",
                "description": "Array of field definitions. Each field needs: field_name, type (1=Text, 2=Number, 3=SingleSelect, etc.)",
                "items": {
                    "type": "object",
                    "properties": {
                        "field_name": { "type": "string" },
                        "type": { "type": "number" }
                    }
                }
            }
        },
        "required": ["app_token", "table_name"]
    })
}

fn list_tables_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "page_size": { "type": "number", "description": "Number of tables to return (max: 100)" },
            "page_token": page_token()
        },
        "required": ["app_token"]
    })
}

fn get_table_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "app_token": app_token(), "table_id": table_id() },
        "required": ["app_token", "table_id"]
    })
}

fn delete_table_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": { "type": "string", "description": "Table ID to delete" }
        },
        "required": ["app_token", "table_id"]
    })
}

fn list_fields_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": table_id(),
            "view_id": { "type": "string", "description": "Optional view ID to scope the listing" },
            "page_size": { "type": "number", "description": "Number of fields to return (max: 100)" },
            "page_token": page_token()
        },
        "required": ["app_token", "table_id"]
    })
}

fn create_field_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": table_id(),
            "field_name": { "type": "string", "description": "Name for the new field" },
            "type": {
                "type": "number",
                "description": "Field type number (1=Text, 2=Number, 3=SingleSelect, etc.)"
            },
            "property": {
                "type": "object",
                "description": "Optional field properties (e.g., options for select fields, formula for formula fields)"
            }
        },
        "required": ["app_token", "table_id", "field_name", "type"]
    })
}

fn update_field_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": table_id(),
            "field_id": { "type": "string", "description": "Field ID to update" },
            "field_name": { "type": "string", "description": "New field name" },
            "property": { "type": "object", "description": "New field properties" }
        },
        "required": ["app_token", "table_id", "field_id"]
    })
}

fn create_record_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": table_id(),
            "fields": {
                "type": "object",
                "description": "Record fields as key-value pairs (e.g., {'Task Name': 'My task', 'Status': 'To Do', 'Due Date': 1735689600000})"
            }
        },
        "required": ["app_token", "table_id", "fields"]
    })
}

fn batch_create_records_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": table_id(),
            "records": {
                "type": "array",
                "description": "Array of record objects, each with 'fields' property",
                "items": {
                    "type": "object",
                    "properties": {
                        "fields": { "type": "object", "description": "Record fields" }
                    }
                }
            }
        },
        "required": ["app_token", "table_id", "records"]
    })
}

fn search_records_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": table_id(),
            "view_id": { "type": "string", "description": "Optional view ID to search within" },
            "filter": {
                "type": "object",
                "description": "Filter conditions. Format: {conjunction: 'and', conditions: [{field_name: 'Status', operator: 'is', value: ['Active']}]}. Operators: is, isNot, contains, doesNotContain, isEmpty, isNotEmpty, isGreater, isLess, etc.",
                "properties": {
                    "conjunction": { "type": "string", "enum": ["and", "or"] },
                    "conditions": { "type": "array" }
                }
            },
            "sort": {
                "type": "array",
                "description": "Sort configuration (e.g., [{field_name: 'Created Time', desc: true}])"
            },
            "field_names": {
                "type": "array",
                "description": "Only return these fields",
                "items": { "type": "string" }
            },
            "page_size": { "type": "number", "description": "Number of records to return (max 500)" },
            "page_token": page_token()
        },
        "required": ["app_token", "table_id"]
    })
}

fn update_record_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": table_id(),
            "record_id": { "type": "string", "description": "Record ID to update (e.g., 'recXXX...')" },
            "fields": {
                "type": "object",
                "description": "Fields to update (only include fields you want to change)"
            }
        },
        "required": ["app_token", "table_id", "record_id", "fields"]
    })
}

fn batch_update_records_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "app_token": app_token(),
            "table_id": table_id(),
            "records": {
                "type": "array",
                "description": "Array of record objects with 'record_id' and 'fields' properties",
                "items": {
                    "type": "object",
                    "properties": {
                        "record_id": { "type": "string", "description": "Record ID" },
                        "fields": { "type": "object", "description": "Fields to update" }
                    }
                }
            }
        },
        "required": ["app_token", "table_id", "records"]
    })
}
