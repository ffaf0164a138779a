//! Built-in skill table. Loaded once at startup unless `TAXONOMY_PATH` points
//! at a JSON taxonomy instead.
//!
//! Keep bare English words (`Express`, `Spring`, `Next`, `Node`) out of the
//! synonym lists: bullets are scanned for every surface form listed here.
//! All-caps acronyms (`REST`, `AWS`) only match bullets case-sensitively.

use crate::skills::taxonomy::CanonicalSkill;

pub const BUILTIN_VERSION: &str = "builtin-2024.2";

struct SkillSeed {
    id: &'static str,
    display: &'static str,
    category: &'static str,
    also: &'static [&'static str],
    synonyms: &'static [&'static str],
}

const fn seed(
    id: &'static str,
    display: &'static str,
    category: &'static str,
    also: &'static [&'static str],
    synonyms: &'static [&'static str],
) -> SkillSeed {
    SkillSeed {
        id,
        display,
        category,
        also,
        synonyms,
    }
}

const LANGUAGE: &str = "programming language";
const FRONTEND: &str = "frontend framework";
const BACKEND: &str = "backend framework";
const CLOUD: &str = "cloud platform";
const CONTAINERS: &str = "containerization";
const RELATIONAL: &str = "relational database";
const NOSQL: &str = "nosql database";
const MESSAGING: &str = "messaging";
const DATA: &str = "data processing";
const CICD: &str = "ci/cd";
const IAC: &str = "infrastructure as code";
const ML: &str = "machine learning framework";
const DESIGN: &str = "design tool";
const MONITORING: &str = "monitoring";
const TESTING: &str = "testing framework";
const MOBILE: &str = "mobile framework";
const API: &str = "api technology";
const VCS: &str = "version control";
const STYLING: &str = "css framework";

const SEEDS: &[SkillSeed] = &[
    // Languages
    seed("python", "Python", LANGUAGE, &[], &["Python3", "Python 3"]),
    seed("javascript", "JavaScript", LANGUAGE, &[], &["JS", "ECMAScript", "ES6"]),
    seed("typescript", "TypeScript", LANGUAGE, &[], &["TS"]),
    seed("java", "Java", LANGUAGE, &[], &[]),
    seed("go", "Go", LANGUAGE, &[], &["Golang"]),
    seed("rust", "Rust", LANGUAGE, &[], &[]),
    seed("c", "C", LANGUAGE, &[], &["ANSI C"]),
    seed("cpp", "C++", LANGUAGE, &[], &["cpp", "CPlusPlus"]),
    seed("csharp", "C#", LANGUAGE, &[], &["CSharp", "C Sharp"]),
    seed("ruby", "Ruby", LANGUAGE, &[], &[]),
    seed("php", "PHP", LANGUAGE, &[], &[]),
    seed("kotlin", "Kotlin", LANGUAGE, &[], &[]),
    seed("swift", "Swift", LANGUAGE, &[MOBILE], &[]),
    seed("scala", "Scala", LANGUAGE, &[], &[]),
    seed("r", "R", LANGUAGE, &[], &["RStudio"]),
    seed("sql", "SQL", "query language", &[], &["Structured Query Language"]),
    // Frontend
    seed("react", "React", FRONTEND, &[], &["React.js", "ReactJS"]),
    seed("vue", "Vue", FRONTEND, &[], &["Vue.js", "VueJS", "Vue 3"]),
    seed("angular", "Angular", FRONTEND, &[], &["AngularJS", "Angular.js"]),
    seed("svelte", "Svelte", FRONTEND, &[], &["SvelteKit"]),
    seed("nextjs", "Next.js", FRONTEND, &[], &["NextJS"]),
    seed("tailwind", "Tailwind CSS", STYLING, &[], &["Tailwind", "TailwindCSS"]),
    seed("bootstrap", "Bootstrap", STYLING, &[], &[]),
    // Backend
    seed("nodejs", "Node.js", BACKEND, &[], &["NodeJS", "Node JS"]),
    seed("express", "Express.js", BACKEND, &[], &["ExpressJS"]),
    seed("django", "Django", BACKEND, &[], &[]),
    seed("flask", "Flask", BACKEND, &[], &[]),
    seed("fastapi", "FastAPI", BACKEND, &[], &[]),
    seed("spring-boot", "Spring Boot", BACKEND, &[], &["SpringBoot", "Spring Framework"]),
    seed("rails", "Ruby on Rails", BACKEND, &[], &["RoR"]),
    seed("laravel", "Laravel", BACKEND, &[], &[]),
    seed("aspnet", "ASP.NET", BACKEND, &[], &["ASP.NET Core", ".NET Core"]),
    seed("nestjs", "NestJS", BACKEND, &[], &["Nest.js"]),
    // Cloud
    seed("aws", "AWS", CLOUD, &[], &["Amazon Web Services"]),
    seed("gcp", "Google Cloud", CLOUD, &[], &["GCP", "Google Cloud Platform"]),
    seed("azure", "Azure", CLOUD, &[], &["Microsoft Azure"]),
    seed("heroku", "Heroku", CLOUD, &[], &[]),
    // Containers
    seed("docker", "Docker", CONTAINERS, &[], &["Dockerfile"]),
    seed("kubernetes", "Kubernetes", CONTAINERS, &["container orchestration"], &["K8s"]),
    seed("openshift", "OpenShift", CONTAINERS, &["container orchestration"], &[]),
    // Databases
    seed("postgresql", "PostgreSQL", RELATIONAL, &[], &["Postgres", "PSQL"]),
    seed("mysql", "MySQL", RELATIONAL, &[], &[]),
    seed("sqlserver", "SQL Server", RELATIONAL, &[], &["MSSQL", "Microsoft SQL Server"]),
    seed("oracle-db", "Oracle Database", RELATIONAL, &[], &["Oracle DB"]),
    seed("sqlite", "SQLite", RELATIONAL, &[], &[]),
    seed("mongodb", "MongoDB", NOSQL, &[], &["Mongo"]),
    seed("dynamodb", "DynamoDB", NOSQL, &[], &["Amazon DynamoDB"]),
    seed("cassandra", "Cassandra", NOSQL, &[], &["Apache Cassandra"]),
    seed("redis", "Redis", NOSQL, &["caching"], &[]),
    seed("memcached", "Memcached", "caching", &[], &[]),
    // Messaging / data
    seed("kafka", "Kafka", MESSAGING, &[DATA], &["Apache Kafka"]),
    seed("rabbitmq", "RabbitMQ", MESSAGING, &[], &[]),
    seed("spark", "Spark", DATA, &[], &["Apache Spark", "PySpark"]),
    seed("hadoop", "Hadoop", DATA, &[], &["Apache Hadoop"]),
    seed("airflow", "Airflow", DATA, &[], &["Apache Airflow"]),
    // CI/CD and infrastructure
    seed("jenkins", "Jenkins", CICD, &[], &[]),
    seed("github-actions", "GitHub Actions", CICD, &[], &["GH Actions"]),
    seed("gitlab-ci", "GitLab CI", CICD, &[], &["GitLab CI/CD"]),
    seed("circleci", "CircleCI", CICD, &[], &["Circle CI"]),
    seed("terraform", "Terraform", IAC, &[], &[]),
    seed("ansible", "Ansible", IAC, &[], &[]),
    seed("pulumi", "Pulumi", IAC, &[], &[]),
    seed("cloudformation", "CloudFormation", IAC, &[], &["AWS CloudFormation"]),
    seed("git", "Git", VCS, &[], &[]),
    // Machine learning
    seed("tensorflow", "TensorFlow", ML, &[], &["TF2"]),
    seed("pytorch", "PyTorch", ML, &[], &[]),
    seed("scikit-learn", "scikit-learn", ML, &[], &["sklearn", "scikit learn"]),
    seed("keras", "Keras", ML, &[], &[]),
    // Design
    seed("figma", "Figma", DESIGN, &[], &[]),
    seed("sketch", "Sketch", DESIGN, &[], &[]),
    seed("adobe-xd", "Adobe XD", DESIGN, &[], &["AdobeXD"]),
    // Observability
    seed("prometheus", "Prometheus", MONITORING, &[], &[]),
    seed("grafana", "Grafana", MONITORING, &[], &[]),
    seed("datadog", "Datadog", MONITORING, &[], &["DataDog"]),
    // Testing
    seed("jest", "Jest", TESTING, &[], &[]),
    seed("pytest", "pytest", TESTING, &[], &["PyTest"]),
    seed("cypress", "Cypress", TESTING, &[], &[]),
    seed("junit", "JUnit", TESTING, &[], &["JUnit5"]),
    seed("selenium", "Selenium", TESTING, &[], &["Selenium WebDriver"]),
    // Mobile
    seed("react-native", "React Native", MOBILE, &[FRONTEND], &["ReactNative"]),
    seed("flutter", "Flutter", MOBILE, &[], &[]),
    // APIs
    seed("graphql", "GraphQL", API, &[], &[]),
    seed("rest", "REST", API, &[], &["RESTful", "REST APIs", "REST API"]),
    seed("grpc", "gRPC", API, &[], &[]),
];

/// Materializes the built-in table.
pub fn builtin_skills() -> Vec<CanonicalSkill> {
    SEEDS
        .iter()
        .map(|s| CanonicalSkill {
            id: s.id.to_string(),
            display_name: s.display.to_string(),
            category: s.category.to_string(),
            secondary_categories: s.also.iter().map(|c| c.to_string()).collect(),
            synonyms: s.synonyms.iter().map(|c| c.to_string()).collect(),
        })
        .collect()
}
