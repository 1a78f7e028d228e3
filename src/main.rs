#[rocket::launch]
fn rocket() -> _ {
    campaign_api::rocket()
}
