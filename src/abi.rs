#[allow(clippy::too_many_arguments)]
pub mod reader {
    alloy::sol! {
        #[derive(Debug)]
        #[sol(rpc)]
        contract Reader {
            struct PerpetualStorage {
                uint8 state;
                bool isMarketClosed;
                string underlyingAsset;
                int256 indexPrice;
                int256 markPrice;
                int256 fundingRate;
                int256 unitAccumulativeFunding;
                int256 initialMarginRate;
                int256 maintenanceMarginRate;
                int256 operatorFeeRate;
                int256 lpFeeRate;
                int256 keeperGasReward;
            }

            struct LiquidityPoolStorage {
                bool isRunning;
                address collateralToken;
                int256 vaultFeeRate;
                uint256 perpetualCount;
                PerpetualStorage[] perpetuals;
            }

            struct MarginAccount {
                int256 cashBalance;
                int256 positionAmount;
                int256 targetLeverage;
            }

            function queryLiquidityPool(address liquidityPool)
                external
                returns (bool isSynced, LiquidityPoolStorage pool);

            function queryAccountStorage(address liquidityPool, uint256 perpetualIndex, address trader)
                external
                returns (bool isSynced, MarginAccount accountStorage);

            function queryTrade(
                address liquidityPool,
                uint256 perpetualIndex,
                address trader,
                int256 amount,
                address referrer,
                uint32 flags
            ) external returns (bool isSynced, int256 tradePrice, int256 totalFee, int256 cost);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub mod registry {
    alloy::sol! {
        #[derive(Debug)]
        #[sol(rpc)]
        contract SymbolRegistry {
            function getMarketIdentifierForSymbol(string symbol)
                external
                view
                returns (address liquidityPool, uint256 perpetualIndex);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub mod pool {
    alloy::sol! {
        #[derive(Debug)]
        #[sol(rpc)]
        contract LiquidityPool {
            function trade(
                uint256 perpetualIndex,
                address trader,
                int256 amount,
                int256 limitPrice,
                uint256 deadline,
                address referrer,
                uint32 flags
            ) external returns (int256 tradeAmount);
        }
    }
}
