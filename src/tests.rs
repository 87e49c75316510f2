//! Integration tests for the car rental backend.

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::init_database;
use crate::{create_router, AppState};

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path).await.expect("Failed to init DB");

        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            cors_origin: "http://localhost:5173".to_string(),
            log_level: "warn".to_string(),
        };

        let app = create_router(AppState::new(pool, config)).expect("Failed to build router");

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_car(&self, make: &str, model: &str, year: i64, car_type: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/api/cars"))
            .json(&json!({
                "make": make,
                "model": model,
                "year": year,
                "type": car_type,
                "available": true
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        resp.json().await.unwrap()
    }

    async fn sign_up(&self, name: &str, email: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/customers/signup"))
            .json(&json!({
                "name": name,
                "email": email,
                "phone_number": "555-0100"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["customerId"].as_str().unwrap().to_string()
    }

    async fn get_json(&self, path: &str) -> (u16, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_car_crud() {
    let fixture = TestFixture::new().await;

    let car = fixture.create_car("Honda", "Civic", 2021, "Sedan").await;
    let car_id = car["_id"].as_str().unwrap();
    assert_eq!(car_id.len(), 24);
    assert_eq!(car["make"], "Honda");
    assert_eq!(car["available"], true);

    // Get car
    let (status, fetched) = fixture.get_json(&format!("/api/car/{}", car_id)).await;
    assert_eq!(status, 200);
    assert_eq!(fetched, car);

    // Update car
    let update_resp = fixture
        .client
        .patch(fixture.url(&format!("/api/cars/{}", car_id)))
        .json(&json!({ "model": "Civic Type R", "year": 2023 }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);
    let update_body: Value = update_resp.json().await.unwrap();
    assert_eq!(update_body, json!({ "success": true }));

    let (_, updated) = fixture.get_json(&format!("/api/car/{}", car_id)).await;
    assert_eq!(updated["model"], "Civic Type R");
    assert_eq!(updated["year"], 2023);
    assert_eq!(updated["type"], "Sedan");

    // List cars
    let (status, list) = fixture.get_json("/api/cars").await;
    assert_eq!(status, 200);
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Delete car
    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/cars/{}", car_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    // Verify deleted
    let (status, body) = fixture.get_json(&format!("/api/car/{}", car_id)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Car not found");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_ids_and_empty_updates() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get_json("/api/customer/not-a-hex-id").await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_ID");

    let delete_resp = fixture
        .client
        .delete(fixture.url("/api/rentals/123"))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 400);

    let car = fixture.create_car("Kia", "Rio", 2017, "Compact").await;
    let empty_resp = fixture
        .client
        .patch(fixture.url(&format!("/api/cars/{}", car["_id"].as_str().unwrap())))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_resp.status(), 400);
    let empty_body: Value = empty_resp.json().await.unwrap();
    assert_eq!(empty_body["code"], "NO_FIELDS_PROVIDED");
    assert_eq!(empty_body["error"], "No valid fields to update");
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/cars"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_customer_crud() {
    let fixture = TestFixture::new().await;

    let create_resp = fixture
        .client
        .post(fixture.url("/api/customers"))
        .json(&json!({
            "name": "Dana",
            "email": "dana@example.com",
            "phone_number": "555-0101",
            "drivers_license": "X9"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 201);
    let customer: Value = create_resp.json().await.unwrap();
    let customer_id = customer["_id"].as_str().unwrap();

    let update_resp = fixture
        .client
        .patch(fixture.url(&format!("/api/customers/{}", customer_id)))
        .json(&json!({ "phone_number": "555-0199" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);

    let (status, fetched) = fixture
        .get_json(&format!("/api/customer/{}", customer_id))
        .await;
    assert_eq!(status, 200);
    assert_eq!(fetched["phone_number"], "555-0199");
    assert_eq!(fetched["drivers_license"], "X9");

    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/customers/{}", customer_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    let (_, list) = fixture.get_json("/api/customers").await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_identity_flows() {
    let fixture = TestFixture::new().await;

    let customer_id = fixture.sign_up("Alice", "a@x.com").await;

    // Duplicate sign-up
    let dup_resp = fixture
        .client
        .post(fixture.url("/api/customers/signup"))
        .json(&json!({ "name": "Alice", "email": "a@x.com", "phone_number": "1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(dup_resp.status(), 400);
    let dup_body: Value = dup_resp.json().await.unwrap();
    assert_eq!(dup_body["error"], "Customer with this email already exists");

    // Sign-in finds the existing customer
    let signin_resp = fixture
        .client
        .post(fixture.url("/api/customers/signin"))
        .json(&json!({ "name": "Alice", "email": "a@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(signin_resp.status(), 200);
    let signin_body: Value = signin_resp.json().await.unwrap();
    assert_eq!(signin_body["customerId"], customer_id.as_str());

    // Sign-in creates an unknown customer
    let new_resp = fixture
        .client
        .post(fixture.url("/api/customers/signin"))
        .json(&json!({ "name": "Bob", "email": "b@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(new_resp.status(), 201);

    // Login
    let login_resp = fixture
        .client
        .post(fixture.url("/api/customers/login"))
        .json(&json!({ "name": "Alice", "email": "a@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(login_resp.status(), 200);
    let login_body: Value = login_resp.json().await.unwrap();
    assert_eq!(login_body["customerId"], customer_id.as_str());

    let bad_login = fixture
        .client
        .post(fixture.url("/api/customers/login"))
        .json(&json!({ "name": "Mallory", "email": "a@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_login.status(), 401);
    let bad_body: Value = bad_login.json().await.unwrap();
    assert_eq!(bad_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_rental_lifecycle() {
    let fixture = TestFixture::new().await;

    let car = fixture.create_car("Toyota", "Corolla", 2020, "Sedan").await;
    let car_id = car["_id"].as_str().unwrap();
    let customer_id = fixture.sign_up("Carol", "carol@example.com").await;

    // Open rental
    let open_resp = fixture
        .client
        .post(fixture.url("/api/rentals/create"))
        .json(&json!({ "car_id": car_id, "customer_id": customer_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(open_resp.status(), 201);
    let rental: Value = open_resp.json().await.unwrap();
    let rental_id = rental["_id"].as_str().unwrap();
    assert_eq!(rental["car_id"], car_id);
    assert_eq!(rental["rental_end_date"], "");
    assert!(!rental["rental_start_date"].as_str().unwrap().is_empty());

    let (_, rented_car) = fixture.get_json(&format!("/api/car/{}", car_id)).await;
    assert_eq!(rented_car["available"], false);

    // Renting the same car again is refused
    let again_resp = fixture
        .client
        .post(fixture.url("/api/rentals/create"))
        .json(&json!({ "car_id": car_id, "customer_id": customer_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(again_resp.status(), 409);

    // Return
    let return_resp = fixture
        .client
        .post(fixture.url(&format!("/api/rentals/{}/return", rental_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(return_resp.status(), 200);
    let return_body: Value = return_resp.json().await.unwrap();
    assert_eq!(return_body, json!({ "success": true }));

    let (_, returned_car) = fixture.get_json(&format!("/api/car/{}", car_id)).await;
    assert_eq!(returned_car["available"], true);

    let (_, closed) = fixture.get_json(&format!("/api/rental/{}", rental_id)).await;
    assert!(!closed["rental_end_date"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_return_unknown_rental() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/rentals/65a1b2c3d4e5f60718293a4b/return"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Rental not found");
}

#[tokio::test]
async fn test_customer_rentals_view() {
    let fixture = TestFixture::new().await;

    let customer_id = fixture.sign_up("Erin", "erin@example.com").await;
    let sedan = fixture.create_car("Mazda", "3", 2019, "Sedan").await;
    let van = fixture.create_car("Ford", "Transit", 2021, "Van").await;

    for car in [&sedan, &van] {
        let resp = fixture
            .client
            .post(fixture.url("/api/rentals/create"))
            .json(&json!({ "car_id": car["_id"], "customer_id": customer_id }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let (status, body) = fixture
        .get_json(&format!("/api/rentals/customer/{}", customer_id))
        .await;
    assert_eq!(status, 200);

    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["car_id"], sedan["_id"]);
    assert_eq!(entries[0]["make"], "Mazda");
    assert_eq!(entries[0]["type"], "Sedan");
    assert_eq!(entries[1]["car_id"], van["_id"]);
    assert_eq!(entries[1]["model"], "Transit");
    assert_eq!(entries[1]["year"], 2021);
    assert!(entries[1]["rental_id"].is_string());

    // A customer without rentals gets an empty list
    let other = fixture.sign_up("Frank", "frank@example.com").await;
    let (_, empty) = fixture
        .get_json(&format!("/api/rentals/customer/{}", other))
        .await;
    assert_eq!(empty, json!([]));
}

#[tokio::test]
async fn test_direct_rental_crud() {
    let fixture = TestFixture::new().await;

    let car = fixture.create_car("Subaru", "Outback", 2018, "Wagon").await;
    let customer_id = fixture.sign_up("Gail", "gail@example.com").await;

    let create_resp = fixture
        .client
        .post(fixture.url("/api/rentals"))
        .json(&json!({
            "car_id": car["_id"],
            "customer_id": customer_id,
            "rental_start_date": "2024-01-01T09:00:00Z",
            "rental_end_date": ""
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 201);
    let rental: Value = create_resp.json().await.unwrap();
    let rental_id = rental["_id"].as_str().unwrap();

    let update_resp = fixture
        .client
        .patch(fixture.url(&format!("/api/rentals/{}", rental_id)))
        .json(&json!({ "rental_end_date": "2024-01-05T09:00:00Z" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 200);

    let (_, fetched) = fixture.get_json(&format!("/api/rental/{}", rental_id)).await;
    assert_eq!(fetched["rental_end_date"], "2024-01-05T09:00:00Z");
    assert_eq!(fetched["rental_start_date"], "2024-01-01T09:00:00Z");

    let (_, list) = fixture.get_json("/api/rentals").await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let delete_resp = fixture
        .client
        .delete(fixture.url(&format!("/api/rentals/{}", rental_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(delete_resp.status(), 200);

    let (status, _) = fixture.get_json(&format!("/api/rental/{}", rental_id)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_direct_rental_rejects_malformed_body_ids() {
    let fixture = TestFixture::new().await;

    let car = fixture.create_car("Mazda", "CX-5", 2020, "SUV").await;
    let customer_id = fixture.sign_up("Hank", "hank@example.com").await;

    let create_resp = fixture
        .client
        .post(fixture.url("/api/rentals"))
        .json(&json!({
            "car_id": "not-a-car",
            "customer_id": customer_id,
            "rental_start_date": "2024-01-01T09:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 400);
    let body: Value = create_resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_ID");

    let create_resp = fixture
        .client
        .post(fixture.url("/api/rentals"))
        .json(&json!({
            "car_id": car["_id"],
            "customer_id": customer_id,
            "rental_start_date": "2024-01-01T09:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(create_resp.status(), 201);
    let rental: Value = create_resp.json().await.unwrap();
    let rental_id = rental["_id"].as_str().unwrap();

    let update_resp = fixture
        .client
        .patch(fixture.url(&format!("/api/rentals/{}", rental_id)))
        .json(&json!({ "customer_id": "12345" }))
        .send()
        .await
        .unwrap();
    assert_eq!(update_resp.status(), 400);
    let body: Value = update_resp.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_ID");

    let (_, fetched) = fixture.get_json(&format!("/api/rental/{}", rental_id)).await;
    assert_eq!(fetched["customer_id"], customer_id.as_str());
    let (_, list) = fixture.get_json("/api/rentals").await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend_origin() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .request(reqwest::Method::OPTIONS, fixture.url("/api/cars"))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "PATCH")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(resp.headers()["access-control-allow-credentials"], "true");
}
