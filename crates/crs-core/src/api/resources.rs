use std::fmt;
use std::str::FromStr;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::{ApiClient, ApiError, Method, RequestDescriptor};
use crate::models::{NewUser, Role};

/// Query parameter list endpoints accept for free-text filtering
const SEARCH_PARAM: &str = "search";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown resource: {0}")]
pub struct UnknownResource(pub String);

/// Collections the API exposes with CRUD verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Lessons,
    Faculties,
    Majors,
    Classrooms,
    Sections,
    Students,
    Professors,
    Admins,
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Lessons,
        Resource::Faculties,
        Resource::Majors,
        Resource::Classrooms,
        Resource::Sections,
        Resource::Students,
        Resource::Professors,
        Resource::Admins,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Resource::Lessons => "/lesson-admin",
            Resource::Faculties => "/faculty",
            Resource::Majors => "/major",
            Resource::Classrooms => "/classroom",
            Resource::Sections => "/section",
            Resource::Students => "/student",
            Resource::Professors => "/professor",
            Resource::Admins => "/admin",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Lessons => "lessons",
            Resource::Faculties => "faculties",
            Resource::Majors => "majors",
            Resource::Classrooms => "classrooms",
            Resource::Sections => "sections",
            Resource::Students => "students",
            Resource::Professors => "professors",
            Resource::Admins => "admins",
        }
    }

    pub fn list_request(self, search: Option<&str>) -> RequestDescriptor {
        let request = RequestDescriptor::get(self.path());
        match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(query) => request.query(SEARCH_PARAM, query),
            None => request,
        }
    }

    pub fn item_request(self, method: Method, id: &str) -> RequestDescriptor {
        RequestDescriptor::new(method, self.path()).segment(id)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = UnknownResource;

    /// Accepts the plural name, the singular, or the path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('/').to_ascii_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.name() == wanted || r.path().trim_start_matches('/') == wanted)
            .or(match wanted.as_str() {
                "lesson" => Some(Resource::Lessons),
                _ => None,
            })
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}

fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::serialize(&e))
}

// ===== Resource CRUD =====

impl ApiClient {
    /// List a collection, optionally filtered server-side by `search`.
    pub async fn list(&self, resource: Resource, search: Option<&str>) -> Result<Value, ApiError> {
        self.request(&resource.list_request(search)).await
    }

    pub async fn list_as<T: DeserializeOwned>(
        &self,
        resource: Resource,
        search: Option<&str>,
    ) -> Result<Vec<T>, ApiError> {
        self.request_as(&resource.list_request(search)).await
    }

    pub async fn fetch(&self, resource: Resource, id: &str) -> Result<Value, ApiError> {
        self.request(&resource.item_request(Method::Get, id)).await
    }

    pub async fn fetch_as<T: DeserializeOwned>(&self, resource: Resource, id: &str) -> Result<T, ApiError> {
        self.request_as(&resource.item_request(Method::Get, id)).await
    }

    pub async fn create<B: Serialize>(&self, resource: Resource, body: &B) -> Result<Value, ApiError> {
        let request = RequestDescriptor::post(resource.path(), to_body(body)?);
        self.request(&request).await
    }

    pub async fn update<B: Serialize>(
        &self,
        resource: Resource,
        id: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let request = resource.item_request(Method::Put, id).with_body(to_body(body)?);
        self.request(&request).await
    }

    pub async fn delete(&self, resource: Resource, id: &str) -> Result<Value, ApiError> {
        self.request(&resource.item_request(Method::Delete, id)).await
    }

    /// Create an account in the collection for `role`.
    pub async fn create_account(&self, role: Role, user: &NewUser) -> Result<Value, ApiError> {
        self.create(role.account_resource(), user).await
    }

    /// List several collections concurrently. Results come back in the
    /// order the resources were given, each paired with its own outcome.
    pub async fn list_many(&self, resources: &[Resource]) -> Vec<(Resource, Result<Value, ApiError>)> {
        let calls = resources.iter().map(|&resource| async move {
            (resource, self.list(resource, None).await)
        });
        join_all(calls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_from_str_variants() {
        assert_eq!("lessons".parse::<Resource>(), Ok(Resource::Lessons));
        assert_eq!("lesson".parse::<Resource>(), Ok(Resource::Lessons));
        assert_eq!("lesson-admin".parse::<Resource>(), Ok(Resource::Lessons));
        assert_eq!("/faculty".parse::<Resource>(), Ok(Resource::Faculties));
        assert_eq!("Majors".parse::<Resource>(), Ok(Resource::Majors));
        assert_eq!("classroom".parse::<Resource>(), Ok(Resource::Classrooms));
        assert_eq!("section".parse::<Resource>(), Ok(Resource::Sections));
        assert_eq!("professor".parse::<Resource>(), Ok(Resource::Professors));
        assert_eq!(
            "grades".parse::<Resource>(),
            Err(UnknownResource("grades".to_string()))
        );
    }

    #[test]
    fn test_every_resource_round_trips_by_name() {
        for resource in Resource::ALL {
            assert_eq!(resource.name().parse::<Resource>(), Ok(resource));
            assert_eq!(resource.path().parse::<Resource>(), Ok(resource));
        }
    }

    #[test]
    fn test_list_request_search() {
        let plain = Resource::Sections.list_request(None);
        assert!(plain.query_pairs().is_empty());

        let blank = Resource::Sections.list_request(Some("   "));
        assert!(blank.query_pairs().is_empty());

        let search = Resource::Lessons.list_request(Some(" math "));
        assert_eq!(search.query_pairs(), [("search".to_string(), "math".to_string())]);
        assert_eq!(search.path(), "/lesson-admin");
    }

    #[test]
    fn test_item_request() {
        let req = Resource::Classrooms.item_request(Method::Delete, "65f0c2");
        assert_eq!(req.method, Method::Delete);
        assert_eq!(req.path(), "/classroom/65f0c2");
        assert!(req.requires_auth);
    }
}
