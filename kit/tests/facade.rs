use outpost::prelude::*;
use outpost_test::MemoryRouter;
use std::sync::Arc;

outpost::declare_outposts! {
    enum Guards {
        Auth = "auth",
    }
}

#[tokio::test]
async fn prelude_covers_a_full_setup() {
    let router = Arc::new(
        MemoryRouter::new()
            .with_simple_route("login", "/login")
            .with_simple_route("admin", "/admin"),
    );
    let engine = Engine::install(router.clone(), EngineConfig::new());
    engine.register_unit(OutpostDef::route(Guards::Auth).handler(Arc::new(RedirectUnless::new(
        RouteLocation::named("login"),
        |ctx: &NavContext| ctx.to.query.contains_key("token"),
    ))));
    assert!(engine.attach_to_route("admin", Guards::Auth));

    let nav = router.navigate(RouteLocation::named("admin")).await;
    assert_eq!(nav.landed_path(), Some("/login"));
}
