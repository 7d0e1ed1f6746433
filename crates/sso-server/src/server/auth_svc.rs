//! AuthService gRPC implementation.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::instrument;

use sso_proto::v1::auth_service_server::AuthService;
use sso_proto::v1::{
    ChangePasswordRequest, ChangePasswordResponse, ForgetPasswordRequest, ForgetPasswordResponse,
    LoginRequest, LogoutRequest, LogoutResponse, RefreshTokensRequest, RegisterRequest,
    RegisterResponse, SendForgetPasswordMessageRequest, SendForgetPasswordMessageResponse,
    SendVerifyEmailMessageRequest, SendVerifyEmailMessageResponse, TokenPair, VerifyEmailRequest,
    VerifyEmailResponse,
};

use super::grpc_util::{id_to_wire, request_context};
use crate::usecases::{self, RegisterUser, UseCases};

pub struct AuthServiceImpl {
    usecases: Arc<UseCases>,
}

impl AuthServiceImpl {
    pub const fn new(usecases: Arc<UseCases>) -> Self {
        Self { usecases }
    }
}

fn token_pair_to_proto(pair: usecases::TokenPair) -> TokenPair {
    TokenPair {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    }
}

#[tonic::async_trait]
impl AuthService for AuthServiceImpl {
    #[instrument(skip(self, request), fields(rpc = "Register"))]
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<RegisterResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let user_id = self
            .usecases
            .register(
                &ctx,
                RegisterUser {
                    email: req.email,
                    password: req.password,
                    display_name: req.display_name,
                },
            )
            .await?;

        Ok(Response::new(RegisterResponse {
            user_id: id_to_wire(user_id),
        }))
    }

    #[instrument(skip(self, request), fields(rpc = "Login"))]
    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<TokenPair>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let pair = self.usecases.login(&ctx, &req.email, &req.password).await?;
        Ok(Response::new(token_pair_to_proto(pair)))
    }

    #[instrument(skip(self, request), fields(rpc = "RefreshTokens"))]
    async fn refresh_tokens(
        &self,
        request: Request<RefreshTokensRequest>,
    ) -> Result<Response<TokenPair>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        let pair = self
            .usecases
            .refresh_tokens(&ctx, &req.refresh_token)
            .await?;
        Ok(Response::new(token_pair_to_proto(pair)))
    }

    #[instrument(skip(self, request), fields(rpc = "Logout"))]
    async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<LogoutResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        self.usecases.logout(&ctx, &req.access_token).await?;
        Ok(Response::new(LogoutResponse {}))
    }

    #[instrument(skip(self, request), fields(rpc = "VerifyEmail"))]
    async fn verify_email(
        &self,
        request: Request<VerifyEmailRequest>,
    ) -> Result<Response<VerifyEmailResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        self.usecases
            .verify_user_email(&ctx, &req.verify_email_token)
            .await?;
        Ok(Response::new(VerifyEmailResponse {}))
    }

    #[instrument(skip(self, request), fields(rpc = "SendVerifyEmailMessage"))]
    async fn send_verify_email_message(
        &self,
        request: Request<SendVerifyEmailMessageRequest>,
    ) -> Result<Response<SendVerifyEmailMessageResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        self.usecases
            .send_verify_email_message(&ctx, &req.email)
            .await?;
        Ok(Response::new(SendVerifyEmailMessageResponse {}))
    }

    #[instrument(skip(self, request), fields(rpc = "ForgetPassword"))]
    async fn forget_password(
        &self,
        request: Request<ForgetPasswordRequest>,
    ) -> Result<Response<ForgetPasswordResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        self.usecases
            .forget_password(&ctx, &req.forget_password_token, &req.new_password)
            .await?;
        Ok(Response::new(ForgetPasswordResponse {}))
    }

    #[instrument(skip(self, request), fields(rpc = "SendForgetPasswordMessage"))]
    async fn send_forget_password_message(
        &self,
        request: Request<SendForgetPasswordMessageRequest>,
    ) -> Result<Response<SendForgetPasswordMessageResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        self.usecases
            .send_forget_password_message(&ctx, &req.email)
            .await?;
        Ok(Response::new(SendForgetPasswordMessageResponse {}))
    }

    #[instrument(skip(self, request), fields(rpc = "ChangePassword"))]
    async fn change_password(
        &self,
        request: Request<ChangePasswordRequest>,
    ) -> Result<Response<ChangePasswordResponse>, Status> {
        let ctx = request_context(&request);
        let req = request.into_inner();

        self.usecases
            .change_password(&ctx, &req.access_token, &req.old_password, &req.new_password)
            .await?;
        Ok(Response::new(ChangePasswordResponse {}))
    }
}
