//! Root application component with routing and context providers.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    ParamSegment, StaticSegment,
    components::{ParentRoute, Redirect, Route, Router, Routes},
};

use crate::components::layout::{AdminLayout, AuthLayout, ClientLayout};
use crate::pages::{
    accept_invitation::AcceptInvitationPage,
    login::LoginPage,
    password_reset::{ForgotPasswordPage, ResetLinkRedirect, ResetPasswordPage},
    register::RegisterPage,
    section::SectionPage,
    unauthorized::{AccountDisabledPage, UnauthorizedPage},
    verify_email::VerifyEmailPage,
};
use crate::routes::{CLIENT_DASHBOARD_PATH, CLIENT_PROFILE_PATH};
use crate::state::auth_context::AuthProvider;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// `AuthProvider` sits inside the router so guards and pages can navigate.
/// Unknown paths and `/` go to the client dashboard, which forwards to the
/// profile page; the section guard takes it from there. The mailed
/// password-reset link lands outside `/auth` and is forwarded into it.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Stylesheet id="leptos" href="/pkg/portal.css"/>
        <Title text="Portal"/>

        <Router>
            <AuthProvider>
                <Routes fallback=|| view! { <Redirect path=CLIENT_DASHBOARD_PATH/> }>
                    <Route path=StaticSegment("") view=|| view! { <Redirect path=CLIENT_DASHBOARD_PATH/> }/>
                    <Route path=StaticSegment("reset-password-confirm") view=ResetLinkRedirect/>
                    <ParentRoute path=StaticSegment("auth") view=AuthLayout>
                        <Route path=StaticSegment("login") view=LoginPage/>
                        <Route path=StaticSegment("register") view=RegisterPage/>
                        <Route path=StaticSegment("forgot-password") view=ForgotPasswordPage/>
                        <Route
                            path=(StaticSegment("password-reset"), ParamSegment("uidb64"), ParamSegment("token"))
                            view=ResetPasswordPage
                        />
                        <Route path=(StaticSegment("activation"), ParamSegment("token")) view=AcceptInvitationPage/>
                        <Route path=StaticSegment("unauthorized") view=AccountDisabledPage/>
                        <Route path=StaticSegment("verify-email") view=VerifyEmailPage/>
                    </ParentRoute>
                    <ParentRoute path=StaticSegment("admin") view=AdminLayout>
                        <Route path=StaticSegment("index") view=SectionPage/>
                        <Route path=StaticSegment("profile") view=SectionPage/>
                        <Route path=StaticSegment("profile-edit") view=SectionPage/>
                        <Route path=StaticSegment("clients") view=SectionPage/>
                        <Route path=StaticSegment("subscriptions") view=SectionPage/>
                        <Route path=StaticSegment("employees") view=SectionPage/>
                        <Route path=StaticSegment("unauthorized") view=UnauthorizedPage/>
                    </ParentRoute>
                    <ParentRoute path=StaticSegment("client") view=ClientLayout>
                        <Route
                            path=StaticSegment("dashboard")
                            view=|| view! { <Redirect path=CLIENT_PROFILE_PATH/> }
                        />
                        <Route path=StaticSegment("profile") view=SectionPage/>
                        <Route path=StaticSegment("profile-edit") view=SectionPage/>
                        <Route path=StaticSegment("source") view=SectionPage/>
                        <Route path=StaticSegment("assistant") view=SectionPage/>
                        <Route path=StaticSegment("destination") view=SectionPage/>
                        <Route path=StaticSegment("data-source") view=SectionPage/>
                        <Route path=(StaticSegment("data-source"), ParamSegment("id")) view=SectionPage/>
                        <Route path=StaticSegment("subscription") view=SectionPage/>
                        <Route path=StaticSegment("manage-team") view=SectionPage/>
                        <Route path=StaticSegment("unauthorized") view=UnauthorizedPage/>
                    </ParentRoute>
                </Routes>
            </AuthProvider>
        </Router>
    }
}
