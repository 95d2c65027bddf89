use ::cirrus_common::{
    dag::{CreateDagRequest, DagInfo, DagName},
    executor::ExecutorLocation,
    function::{CreateFunctionRequest, FunctionName, FunctionPlacement},
};

type Result<T> = std::result::Result<T, reqwest::Error>;

/// Client of the Cirrus scheduler control API.
pub struct ControlClient<'a> {
    /// Base URL of the scheduler.
    base_url: &'a str,
    /// HTTP client for making requests to the scheduler.
    client: reqwest::Client,
}

impl<'a> ControlClient<'a> {
    pub fn new(base_url: &'a str) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn create_function(&self, request: &CreateFunctionRequest) -> Result<()> {
        let url = self.build_url("/function");
        self.client
            .post(url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn list_functions(&self) -> Result<Vec<FunctionName>> {
        let url = self.build_url("/function");
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn get_function_placement(&self, name: &str) -> Result<FunctionPlacement> {
        let url = self.build_url(&format!("/function/{}", name));
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Count one call of `name`, return the updated count.
    pub async fn record_call(&self, name: &str) -> Result<u64> {
        let url = self.build_url(&format!("/function/{}/call", name));
        self.client
            .post(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Create a DAG. The call returns once every replica is pinned,
    /// or fails with `503 Service Unavailable` when there are not enough executors.
    pub async fn create_dag(&self, request: &CreateDagRequest) -> Result<()> {
        let url = self.build_url("/dag");
        self.client
            .post(url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn get_dag(&self, name: &str) -> Result<DagInfo> {
        let url = self.build_url(&format!("/dag/{}", name));
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn list_dags(&self) -> Result<Vec<DagName>> {
        let url = self.build_url("/dag");
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    pub async fn delete_dag(&self, name: &str) -> Result<()> {
        let url = self.build_url(&format!("/dag/{}", name));
        self.client.delete(url).send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn register_executor(&self, location: &ExecutorLocation) -> Result<()> {
        let url = self.build_url("/executor");
        self.client
            .post(url)
            .json(location)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn deregister_executor(&self, location: &ExecutorLocation) -> Result<()> {
        let url = self.build_url(&format!("/executor/{}/{}", location.node, location.slot));
        self.client.delete(url).send().await?.error_for_status()?;
        Ok(())
    }

    pub async fn list_executors(&self) -> Result<Vec<ExecutorLocation>> {
        let url = self.build_url("/executor");
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        self.base_url.to_owned() + path
    }
}
