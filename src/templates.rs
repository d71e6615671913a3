//! Text rendering for generated Kotlin sources and the Gradle build file.

use crate::generator::{
    ClassKind, KotlinClass, KotlinController, KotlinMethod, KotlinParameter, KotlinProperty,
    ParameterLocation,
};

/// Renders generator models into Kotlin source text.
#[derive(Debug)]
pub struct TemplateEngine {
    include_swagger: bool,
}

impl TemplateEngine {
    pub fn new(include_swagger: bool) -> TemplateEngine {
        TemplateEngine { include_swagger }
    }

    pub fn kotlin_class(&self, class: &KotlinClass) -> String {
        match &class.kind {
            ClassKind::Data => self.data_class(class),
            ClassKind::Sealed {
                discriminator,
                subtypes,
            } => self.sealed_class(class, discriminator, subtypes),
            ClassKind::Union => self.union_class(class),
            ClassKind::Alias { target } => alias(class, target),
        }
    }

    pub fn kotlin_controller(&self, controller: &KotlinController) -> String {
        let mut content = header(
            &controller.package,
            &controller.imports,
            controller.description.as_deref(),
        );

        content.push_str(&format!("interface {} {{\n\n", controller.name));
        for method in &controller.methods {
            content.push_str(&self.method_content(method));
            content.push('\n');
        }
        content.push_str("}\n");

        content
    }

    fn data_class(&self, class: &KotlinClass) -> String {
        let mut content = header(&class.package, &class.imports, class.description.as_deref());
        content.push_str(&self.schema_annotation(class, ""));
        content.push_str(&self.class_body(class, None));
        content
    }

    fn sealed_class(
        &self,
        class: &KotlinClass,
        discriminator: &str,
        subtypes: &[KotlinClass],
    ) -> String {
        let mut content = header(&class.package, &class.imports, class.description.as_deref());
        content.push_str(&self.schema_annotation(class, ""));

        content.push_str("@JsonTypeInfo(\n");
        content.push_str("    use = JsonTypeInfo.Id.NAME,\n");
        content.push_str("    include = JsonTypeInfo.As.PROPERTY,\n");
        content.push_str(&format!("    property = \"{discriminator}\"\n"));
        content.push_str(")\n");

        content.push_str("@JsonSubTypes(\n");
        for (i, subtype) in subtypes.iter().enumerate() {
            let separator = if i + 1 == subtypes.len() { "" } else { "," };
            content.push_str(&format!(
                "    JsonSubTypes.Type(value = {0}::class, name = \"{0}\"){1}\n",
                subtype.name, separator
            ));
        }
        content.push_str(")\n");

        content.push_str(&format!("sealed class {}\n", class.name));

        for subtype in subtypes {
            content.push('\n');
            if let Some(description) = &subtype.description {
                content.push_str(&format!("/**\n * {description}\n */\n"));
            }
            content.push_str(&self.class_body(subtype, Some(&class.name)));
        }

        content
    }

    fn union_class(&self, class: &KotlinClass) -> String {
        let mut content = header(&class.package, &class.imports, class.description.as_deref());
        content.push_str(&self.schema_annotation(class, ""));

        content.push_str(&format!("data class {}(\n", class.name));
        for (i, property) in class.properties.iter().enumerate() {
            let is_last = i + 1 == class.properties.len();
            content.push_str(&self.property_content(property, is_last));
        }
        content.push_str(") {\n");
        content.push_str("    companion object {\n");
        content.push_str("        @JsonCreator\n");
        content.push_str("        @JvmStatic\n");
        content.push_str(&format!(
            "        fun of(value: Any): {0} = {0}(value)\n",
            class.name
        ));
        content.push_str("    }\n");
        content.push_str("}\n");

        content
    }

    /// Data class body, or a plain class when there are no properties
    /// (Kotlin data classes need at least one constructor parameter).
    fn class_body(&self, class: &KotlinClass, parent: Option<&str>) -> String {
        let suffix = parent
            .map(|parent| format!(" : {parent}()"))
            .unwrap_or_default();

        if class.properties.is_empty() {
            return format!("class {}{}\n", class.name, suffix);
        }

        let mut content = format!("data class {}(\n", class.name);
        for (i, property) in class.properties.iter().enumerate() {
            let is_last = i + 1 == class.properties.len();
            content.push_str(&self.property_content(property, is_last));
        }
        content.push_str(&format!("){}\n", suffix));
        content
    }

    fn property_content(&self, property: &KotlinProperty, is_last: bool) -> String {
        let mut content = String::new();

        if let Some(description) = &property.description {
            content.push_str(&format!("    /**\n     * {description}\n     */\n"));
        }

        if self.include_swagger {
            let description = property.description.as_deref().unwrap_or(&property.name);
            content.push_str(&format!("    @Schema(description = \"{description}\""));
            if let Some(default_value) = &property.default_value {
                if default_value != "null" {
                    content.push_str(&format!(", example = \"{default_value}\""));
                }
            }
            content.push_str(")\n");
        }

        if let Some(json_name) = &property.json_name {
            content.push_str(&format!("    @JsonProperty(\"{json_name}\")\n"));
        }

        for annotation in &property.annotations {
            content.push_str(&format!("    {annotation}\n"));
        }

        let nullable = if property.nullable { "?" } else { "" };
        let default = property
            .default_value
            .as_ref()
            .map(|value| format!(" = {value}"))
            .unwrap_or_default();
        content.push_str(&format!(
            "    val {}: {}{}{}",
            property.name, property.kotlin_type, nullable, default
        ));
        if !is_last {
            content.push(',');
        }
        content.push('\n');

        content
    }

    fn method_content(&self, method: &KotlinMethod) -> String {
        let mut content = String::new();

        if self.include_swagger && (method.summary.is_some() || method.description.is_some()) {
            let summary = method.summary.as_deref().unwrap_or(&method.name);
            content.push_str(&format!("    @Operation(summary = \"{summary}\""));
            if let Some(description) = &method.description {
                content.push_str(&format!(", description = \"{description}\""));
            }
            content.push_str(")\n");

            let response = method.response_description.as_deref().unwrap_or("Success");
            content.push_str("    @ApiResponses(value = [\n");
            content.push_str(&format!(
                "        ApiResponse(responseCode = \"200\", description = \"{response}\"),\n"
            ));
            content.push_str(
                "        ApiResponse(responseCode = \"400\", description = \"Bad Request\")\n",
            );
            content.push_str("    ])\n");
        }

        content.push_str(&format!(
            "    @{}(\"{}\")\n",
            http_annotation(&method.http_method),
            method.path
        ));
        content.push_str(&format!("    fun {}(\n", method.name));

        let mut all_parameters = method.parameters.clone();
        if let Some(request_body) = &method.request_body {
            all_parameters.push(request_body.clone());
        }
        for (i, parameter) in all_parameters.iter().enumerate() {
            let is_last = i + 1 == all_parameters.len();
            content.push_str(&parameter_content(parameter, is_last));
        }

        content.push_str(&format!("    ): {}\n", method.return_type));
        content
    }

    fn schema_annotation(&self, class: &KotlinClass, indent: &str) -> String {
        if !self.include_swagger {
            return String::new();
        }
        let description = class.description.as_deref().unwrap_or(&class.name);
        format!("{indent}@Schema(description = \"{description}\")\n")
    }

    pub fn build_file(&self, base_package: &str) -> String {
        format!(
            r#"plugins {{
    kotlin("jvm") version "1.9.20"
    kotlin("plugin.spring") version "1.9.20"
    id("org.springframework.boot") version "3.1.0"
    id("io.spring.dependency-management") version "1.1.0"
}}

group = "{base_package}"
version = "0.0.1-SNAPSHOT"

repositories {{
    mavenCentral()
}}

dependencies {{
    implementation("org.springframework.boot:spring-boot-starter-web")
    implementation("org.springframework.boot:spring-boot-starter-validation")
    implementation("com.fasterxml.jackson.module:jackson-module-kotlin")
    implementation("org.jetbrains.kotlin:kotlin-reflect")
    implementation("org.springdoc:springdoc-openapi-starter-webmvc-ui:2.1.0")
    testImplementation("org.springframework.boot:spring-boot-starter-test")
}}

tasks.withType<org.jetbrains.kotlin.gradle.tasks.KotlinCompile> {{
    kotlinOptions {{
        freeCompilerArgs = listOf("-Xjsr305=strict")
        jvmTarget = "17"
    }}
}}

tasks.withType<Test> {{
    useJUnitPlatform()
}}
"#
        )
    }
}

fn header(package: &str, imports: &[String], description: Option<&str>) -> String {
    let mut content = format!("package {package}\n\n");

    if !imports.is_empty() {
        for import in imports {
            content.push_str(&format!("import {import}\n"));
        }
        content.push('\n');
    }

    if let Some(description) = description {
        content.push_str(&format!("/**\n * {description}\n */\n"));
    }

    content
}

fn alias(class: &KotlinClass, target: &str) -> String {
    let mut content = format!("package {}\n\n", class.package);
    if let Some(description) = &class.description {
        content.push_str(&format!("/**\n * {description}\n */\n"));
    }
    content.push_str(&format!("typealias {} = {}\n", class.name, target));
    content
}

fn parameter_content(parameter: &KotlinParameter, is_last: bool) -> String {
    let mut content = String::from("        ");

    for annotation in &parameter.annotations {
        content.push_str(&format!("{annotation} "));
    }

    content.push_str(&format!(
        "{} {}: {}",
        parameter_annotation(parameter),
        parameter.name,
        parameter.kotlin_type
    ));

    if !parameter.required && parameter.location != ParameterLocation::Body {
        content.push('?');
    }
    if !is_last {
        content.push(',');
    }
    content.push('\n');

    content
}

fn http_annotation(method: &str) -> &'static str {
    match method {
        "get" => "GetMapping",
        "post" => "PostMapping",
        "put" => "PutMapping",
        "delete" => "DeleteMapping",
        "patch" => "PatchMapping",
        "head" => "HeadMapping",
        "options" => "OptionsMapping",
        _ => "RequestMapping",
    }
}

fn parameter_annotation(parameter: &KotlinParameter) -> String {
    match parameter.location {
        ParameterLocation::Path => "@PathVariable".to_string(),
        ParameterLocation::Query => format!("@RequestParam(required = {})", parameter.required),
        ParameterLocation::Header => format!("@RequestHeader(required = {})", parameter.required),
        ParameterLocation::Body => "@RequestBody".to_string(),
    }
}
